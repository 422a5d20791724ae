//! Approve/Deny action buttons.
//!
//! ntfy renders `http` actions as buttons on the notification. Tapping one
//! makes the phone POST a [`DecisionPayload`] to the response topic, which
//! the hook is polling. `clear=true` dismisses the notification afterwards.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hook::Decision;

/// Body the phone posts to the response topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionPayload {
    /// Correlation id of the tool call being answered.
    pub id: String,
    /// `allow` or `deny`; any other JSON value is carried through so the
    /// caller can tell "answered with something odd" from "not answered".
    #[serde(default)]
    pub decision: Option<Value>,
}

impl DecisionPayload {
    /// Payload for a known decision.
    pub fn new(id: &str, decision: Decision) -> Self {
        Self {
            id: id.to_string(),
            decision: Some(Value::String(decision.as_str().to_string())),
        }
    }
}

/// Builds the `Actions` header value for the approval notification.
///
/// Both buttons post to `response_url` with the same `Authorization` the
/// hook uses, so the phone never needs its own credentials.
pub fn approval_actions(response_url: &str, auth_header: &str, correlation_id: &str) -> Result<String> {
    let buttons = [("Approve", Decision::Allow), ("Deny", Decision::Deny)]
        .into_iter()
        .map(|(label, decision)| -> Result<String> {
            let body = serde_json::to_string(&DecisionPayload::new(correlation_id, decision))?;
            Ok(format!(
                "http, {label}, {response_url}, headers.Authorization={auth_header}, body='{body}', clear=true"
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(buttons.join("; "))
}
