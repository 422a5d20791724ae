// Shared helpers for integration tests.
//
// A wiremock server plays the ntfy server; helpers build credential files
// pointing at it and ntfy poll responses.

#![allow(dead_code, reason = "not every test binary uses every helper")]

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::MockServer;

pub const APPROVE_TOPIC: &str = "approve";
pub const RESPONSE_TOPIC: &str = "response";

/// Credential file contents for a mock server.
pub fn credentials_for(server_uri: &str) -> String {
    format!(
        "# test credentials\n\
         NTFY_SERVER={server_uri}\n\
         NTFY_TAILSCALE_URL=https://phone.example.ts.net\n\
         NTFY_USER=tester\n\
         NTFY_PASS=secret\n\
         NTFY_TOPIC_APPROVE={APPROVE_TOPIC}\n\
         NTFY_TOPIC_RESPONSE={RESPONSE_TOPIC}\n"
    )
}

/// `Authorization` value matching [`credentials_for`] (base64 of `tester:secret`).
pub const AUTH_HEADER: &str = "Basic dGVzdGVyOnNlY3JldA==";

/// Writes a credential file for `server` into `dir`.
pub fn write_credentials(dir: &Path, server: &MockServer) -> PathBuf {
    let path = dir.join("credentials");
    std::fs::write(&path, credentials_for(&server.uri())).expect("write credentials");
    path
}

/// One ntfy `message` event carrying a decision payload, as a poll response line.
pub fn decision_event(id: &str, decision: &str) -> String {
    let payload = serde_json::json!({ "id": id, "decision": decision }).to_string();
    serde_json::json!({
        "id": "evt123",
        "time": 1_700_000_000,
        "event": "message",
        "topic": RESPONSE_TOPIC,
        "message": payload,
    })
    .to_string()
}

/// Hook stdin for a Bash tool call.
pub fn bash_hook_input(tool_use_id: &str) -> String {
    serde_json::json!({
        "session_id": "sess-1",
        "hook_event_name": "PermissionRequest",
        "tool_use_id": tool_use_id,
        "tool_name": "Bash",
        "tool_input": { "command": "cargo publish", "description": "Publish the crate" },
        "cwd": "/home/me/webapp",
    })
    .to_string()
}

/// Temp dir holding credentials and the log file for one test.
pub struct Sandbox {
    pub dir: TempDir,
    pub credentials: PathBuf,
}

impl Sandbox {
    pub fn new(server: &MockServer) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let credentials = write_credentials(dir.path(), server);
        Self { dir, credentials }
    }

    pub fn log_file(&self) -> PathBuf {
        self.dir.path().join("ntfy-approve.log")
    }
}

/// Requests the mock server received with the given method.
pub async fn requests_with_method(server: &MockServer, method: &str) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == method)
        .collect()
}
