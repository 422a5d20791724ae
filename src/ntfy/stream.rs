//! Parsing of ntfy poll responses.
//!
//! `GET /<topic>/json?poll=1` returns one JSON event per line. Only
//! `message` events carry data; their `message` field holds the
//! [`DecisionPayload`] the phone posted, as a JSON string.

use serde::Deserialize;

use super::actions::DecisionPayload;
use crate::hook::{display_value, Decision};

/// A reply from the phone that matched the pending tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The user tapped Approve or Deny.
    Decided(Decision),
    /// A matching reply with an unknown or missing decision value
    /// (non-string values rendered as JSON).
    Unrecognized(Option<String>),
}

impl From<DecisionPayload> for Reply {
    fn from(payload: DecisionPayload) -> Self {
        let decision = payload.decision.as_ref();
        match decision.and_then(serde_json::Value::as_str).and_then(Decision::parse) {
            Some(decision) => Self::Decided(decision),
            None => Self::Unrecognized(decision.map(|v| display_value(v).into_owned())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Event {
    event: String,
    #[serde(default)]
    message: Option<String>,
}

/// Finds the first reply addressed to `correlation_id` in a poll response.
///
/// Blank lines, lines that are not JSON, non-`message` events (`open`,
/// `keepalive`, ...) and messages that are not decision payloads are
/// skipped. Replies for other tool calls are ignored.
pub fn find_reply(body: &str, correlation_id: &str) -> Option<Reply> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str::<Event>(line).ok())
        .filter(|event| event.event == "message")
        .filter_map(|event| serde_json::from_str::<DecisionPayload>(event.message.as_deref()?).ok())
        .find(|payload| payload.id == correlation_id)
        .map(Reply::from)
}
