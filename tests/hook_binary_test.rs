// End-to-end tests for the ntfy-approve binary in hook mode.
//
// These tests verify that:
// 1. A tap on the phone is printed as the hook result and the prompt is not deleted
// 2. Timeouts and unrecognized replies delete the prompt and print nothing
// 3. Bad input and missing credentials exit 0 silently without network traffic
// 4. SIGTERM (terminal answered first) deletes the prompt and exits 0
//
// Run with: cargo test --test hook_binary_test

mod common;

use common::{decision_event, Sandbox, APPROVE_TOPIC, RESPONSE_TOPIC};
use std::io::Write;
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn hook_command(sandbox: &Sandbox, timeout_secs: u64) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ntfy-approve"));
    cmd.env("NTFY_CREDENTIALS_FILE", &sandbox.credentials)
        .env("NTFY_APPROVE_LOG_FILE", sandbox.log_file())
        .env("NTFY_APPROVE_TIMEOUT", timeout_secs.to_string())
        .env("NTFY_APPROVE_POLL_INTERVAL", "1")
        .env("HOME", sandbox.dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

fn spawn_with_input(mut cmd: Command, input: &str) -> Child {
    let mut child = cmd.spawn().expect("Failed to spawn ntfy-approve");
    let mut stdin = child.stdin.take().expect("stdin is piped");
    stdin.write_all(input.as_bytes()).expect("write stdin");
    drop(stdin);
    child
}

/// Runs the hook to completion off the async runtime.
async fn run_hook(cmd: Command, input: String) -> Output {
    tokio::task::spawn_blocking(move || {
        spawn_with_input(cmd, &input)
            .wait_with_output()
            .expect("Failed to wait for ntfy-approve")
    })
    .await
    .unwrap()
}

async fn mount_ntfy(server: &MockServer, poll_body: String) {
    Mock::given(method("POST"))
        .and(path(format!("/{APPROVE_TOPIC}")))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{RESPONSE_TOPIC}/json")))
        .respond_with(ResponseTemplate::new(200).set_body_string(poll_body))
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_phone_approval_is_printed() {
    let server = MockServer::start().await;
    mount_ntfy(&server, decision_event("toolu_yes", "allow")).await;
    let sandbox = Sandbox::new(&server);

    let output = run_hook(hook_command(&sandbox, 30), common::bash_hook_input("toolu_yes")).await;

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        r#"{"jsonrpc":"2.0","result":{"decision":"allow"}}"#
    );
    assert!(common::requests_with_method(&server, "DELETE").await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_phone_denial_is_printed() {
    let server = MockServer::start().await;
    mount_ntfy(&server, decision_event("toolu_no", "deny")).await;
    let sandbox = Sandbox::new(&server);

    let output = run_hook(hook_command(&sandbox, 30), common::bash_hook_input("toolu_no")).await;

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        r#"{"jsonrpc":"2.0","result":{"decision":"deny"}}"#
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_timeout_deletes_prompt_silently() {
    let server = MockServer::start().await;
    mount_ntfy(&server, decision_event("toolu_someone_else", "allow")).await;
    let sandbox = Sandbox::new(&server);

    let output = run_hook(hook_command(&sandbox, 1), common::bash_hook_input("toolu_wait")).await;

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let deletes = common::requests_with_method(&server, "DELETE").await;
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].url.path(), format!("/{APPROVE_TOPIC}/toolu_wait"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unrecognized_reply_deletes_prompt() {
    let server = MockServer::start().await;
    mount_ntfy(&server, decision_event("toolu_odd", "snooze")).await;
    let sandbox = Sandbox::new(&server);

    let started = Instant::now();
    let output = run_hook(hook_command(&sandbox, 60), common::bash_hook_input("toolu_odd")).await;

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(started.elapsed() < Duration::from_secs(30), "should not wait for the timeout");
    assert_eq!(common::requests_with_method(&server, "DELETE").await.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_input_exits_silently() {
    let server = MockServer::start().await;
    mount_ntfy(&server, String::new()).await;
    let sandbox = Sandbox::new(&server);

    let output = run_hook(hook_command(&sandbox, 30), "{not json".to_string()).await;

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_tool_use_id_exits_silently() {
    let server = MockServer::start().await;
    mount_ntfy(&server, String::new()).await;
    let sandbox = Sandbox::new(&server);

    let input = r#"{"tool_name": "Bash", "tool_input": {"command": "ls"}}"#.to_string();
    let output = run_hook(hook_command(&sandbox, 30), input).await;

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_credentials_exits_silently() {
    let server = MockServer::start().await;
    mount_ntfy(&server, String::new()).await;
    let sandbox = Sandbox::new(&server);
    std::fs::remove_file(&sandbox.credentials).unwrap();

    let output = run_hook(hook_command(&sandbox, 30), common::bash_hook_input("toolu_x")).await;

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty(), "failures go to the log file, not stderr");
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_publish_failure_exits_without_polling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let sandbox = Sandbox::new(&server);

    let output = run_hook(hook_command(&sandbox, 30), common::bash_hook_input("toolu_500")).await;

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(common::requests_with_method(&server, "GET").await.is_empty());
    assert!(common::requests_with_method(&server, "DELETE").await.is_empty());
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_sigterm_deletes_prompt_and_exits_zero() {
    let server = MockServer::start().await;
    mount_ntfy(&server, String::new()).await;
    let sandbox = Sandbox::new(&server);

    let mut child = spawn_with_input(
        hook_command(&sandbox, 120),
        &common::bash_hook_input("toolu_term"),
    );

    // Wait until the prompt is published
    let deadline = Instant::now() + Duration::from_secs(10);
    while common::requests_with_method(&server, "POST").await.is_empty() {
        assert!(Instant::now() < deadline, "prompt was never published");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    // SAFETY: kill(2) on the pid of a child we spawned and have not reaped.
    let rc = unsafe { libc::kill(child.id() as libc::pid_t, libc::SIGTERM) };
    assert_eq!(rc, 0);

    let status = tokio::task::spawn_blocking(move || {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(status) = child.try_wait().expect("try_wait") {
                return Some(status);
            }
            if Instant::now() > deadline {
                let _ = child.kill();
                return None;
            }
            thread::sleep(Duration::from_millis(50));
        }
    })
    .await
    .unwrap()
    .expect("hook did not exit after SIGTERM");

    assert!(status.success(), "expected exit 0 after SIGTERM, got {status:?}");
    let deletes = common::requests_with_method(&server, "DELETE").await;
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].url.path(), format!("/{APPROVE_TOPIC}/toolu_term"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_command_hides_password() {
    let server = MockServer::start().await;
    let sandbox = Sandbox::new(&server);

    let mut cmd = hook_command(&sandbox, 30);
    cmd.arg("config").arg("--timeout").arg("7").stdin(Stdio::null());
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["config"]["timeout_secs"], 7);
    assert_eq!(report["credentials"]["user"], "tester");
    assert_eq!(report["credentials"]["topic_approve"], APPROVE_TOPIC);
    assert!(!String::from_utf8_lossy(&output.stdout).contains("secret"));
}
