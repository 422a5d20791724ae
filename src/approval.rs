//! The approval flow: publish, wait for the phone, reconcile.
//!
//! ```text
//! stdin ──► HookInput ──► Notification ──► publish ──► arm cleanup
//!                                                        │
//!                         ┌───────── poll every N s ◄────┘
//!                         │
//!            allow/deny ──┴──► disarm, print result
//!     timeout/other reply ──► (cleanup deletes the prompt at exit)
//! ```
//!
//! # Design
//!
//! Functions here are regular functions over an [`NtfyClient`] and an
//! [`ExitCleanup`] rather than one stateful object, so the wait loop can be
//! exercised against a mock server.

use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use crate::cleanup::ExitCleanup;
use crate::config::Config;
use crate::credentials::Credentials;
use crate::hook::{Decision, HookInput, HookOutput};
use crate::notification::Notification;
use crate::ntfy::{NtfyClient, Reply};

/// Timing for the decision wait loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    /// Total time to wait for a reply.
    pub timeout: Duration,
    /// Pause after each poll.
    pub poll_interval: Duration,
}

/// Polls until a reply to `correlation_id` arrives or `settings.timeout` elapses.
///
/// Poll errors (server down, non-2xx) are logged and the loop keeps going;
/// the terminal prompt is still running in parallel, so there is nothing
/// better to do than try again.
pub fn wait_for_reply(
    client: &NtfyClient,
    correlation_id: &str,
    since: i64,
    settings: WaitSettings,
) -> Option<Reply> {
    let start = Instant::now();
    let mut attempt = 0u32;

    while start.elapsed() < settings.timeout {
        attempt += 1;
        match client.poll(since, correlation_id) {
            Ok(Some(reply)) => {
                log::info!("Reply for {correlation_id} after {attempt} poll(s): {reply:?}");
                return Some(reply);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Poll attempt {attempt} failed: {e:#}"),
        }
        thread::sleep(settings.poll_interval);
    }

    log::info!(
        "No reply for {correlation_id} within {}s ({attempt} poll(s))",
        settings.timeout.as_secs()
    );
    None
}

/// Publishes the prompt for `input` and waits for the phone.
///
/// Arms `cleanup` with a remote delete as soon as the prompt is published,
/// and disarms it only when the phone answered `allow` or `deny` (tapping a
/// button already cleared the notification).
pub fn request_decision(
    client: &NtfyClient,
    input: &HookInput,
    settings: WaitSettings,
    cleanup: &ExitCleanup,
) -> Result<Option<Decision>> {
    let notification = Notification::for_tool_call(input);
    let correlation_id = input.tool_use_id.as_str();

    // Taken before publishing so a very fast tap is never older than `since`
    let since = chrono::Utc::now().timestamp();

    let message_id = client.publish(&notification, correlation_id)?;
    let deleter = client.clone();
    cleanup.arm(move || deleter.delete(&message_id));

    match wait_for_reply(client, correlation_id, since, settings) {
        Some(Reply::Decided(decision)) => {
            cleanup.disarm();
            Ok(Some(decision))
        }
        Some(Reply::Unrecognized(value)) => {
            log::warn!("Ignoring unrecognized decision {value:?} for {correlation_id}");
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Runs the hook: reads the tool call from `stdin`, writes the result to `stdout`.
///
/// Returns `Ok(())` without output when there is nothing to ask (no
/// `tool_use_id`) or the phone did not answer. Errors are for the caller
/// to log; the hook's exit status is 0 either way.
pub fn run(
    config: &Config,
    mut stdin: impl Read,
    mut stdout: impl Write,
    cleanup: &ExitCleanup,
) -> Result<()> {
    let mut raw = String::new();
    stdin
        .read_to_string(&mut raw)
        .context("Failed to read hook input")?;
    let input = HookInput::from_json(&raw).context("Malformed hook input")?;

    if input.tool_use_id.is_empty() {
        log::info!("Hook input has no tool_use_id, nothing to approve");
        return Ok(());
    }

    let credentials = Credentials::load(&config.credentials_path)?;
    let client = NtfyClient::new(credentials)?;

    log::info!(
        "Requesting approval for {} ({})",
        input.tool_name,
        input.tool_use_id
    );

    if let Some(decision) = request_decision(&client, &input, config.wait_settings(), cleanup)? {
        let output = HookOutput::new(decision).to_json()?;
        writeln!(stdout, "{output}").context("Failed to write hook result")?;
        stdout.flush().context("Failed to flush hook result")?;
        log::info!("Phone answered {decision} for {}", input.tool_use_id);
    }

    Ok(())
}
