//! Permission-request hook envelope.
//!
//! The host writes one JSON object describing the pending tool call to
//! stdin. If the phone answers, a single JSON-RPC-shaped result is written
//! to stdout; in every other case the hook stays silent.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Tool invocation descriptor read from stdin.
///
/// Missing fields and explicit `null`s both fall back to the defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct HookInput {
    /// Correlation id for this tool call. Empty means the hook has nothing to do.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_use_id: String,
    /// Tool being invoked (`Bash`, `Edit`, ...).
    #[serde(default = "unknown_tool", deserialize_with = "null_as_unknown_tool")]
    pub tool_name: String,
    /// Tool arguments, in the order the host sent them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_input: Map<String, Value>,
    /// Working directory of the session.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cwd: String,
}

fn unknown_tool() -> String {
    "Unknown".to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn null_as_unknown_tool<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|name| name.unwrap_or_else(unknown_tool))
}

impl HookInput {
    /// Parses the stdin payload.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Returns an argument from `tool_input` as text.
    ///
    /// Absent and `null` arguments are `""`; other non-string values are
    /// rendered as compact JSON.
    pub fn input_str(&self, key: &str) -> Cow<'_, str> {
        match self.tool_input.get(key) {
            None | Some(Value::Null) => Cow::Borrowed(""),
            Some(value) => display_value(value),
        }
    }
}

/// Renders a JSON value for display: strings bare, anything else as compact JSON.
pub fn display_value(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

/// A decision made on the phone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Let the tool call proceed.
    Allow,
    /// Reject the tool call.
    Deny,
}

impl Decision {
    /// Returns the wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }

    /// Parses a wire value; anything other than `allow`/`deny` is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "allow" => Some(Self::Allow),
            "deny" => Some(Self::Deny),
            _ => None,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result written to stdout when the phone answers.
#[derive(Debug, Serialize)]
pub struct HookOutput {
    jsonrpc: &'static str,
    result: DecisionResult,
}

#[derive(Debug, Serialize)]
struct DecisionResult {
    decision: Decision,
}

impl HookOutput {
    /// Wraps a decision in the JSON-RPC envelope.
    pub fn new(decision: Decision) -> Self {
        Self {
            jsonrpc: "2.0",
            result: DecisionResult { decision },
        }
    }

    /// Serializes to a single line of JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
