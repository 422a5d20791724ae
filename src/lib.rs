//! ntfy-approve - approve agent tool calls from your phone.
//!
//! A permission-request hook for coding agents. While the terminal prompt
//! waits as usual, the hook publishes an ntfy notification with Approve and
//! Deny buttons and polls for the answer. Whichever side answers first wins:
//! a tap on the phone is returned to the host on stdout, and if the host
//! kills the hook because the terminal answered, the notification is deleted
//! from the phone.
//!
//! # Modules
//!
//! - [`approval`] - Publish/poll/reconcile flow
//! - [`cleanup`] - Exit-time remote delete, signal handling
//! - [`config`] - Settings from defaults, environment and flags
//! - [`credentials`] - ntfy credential file
//! - [`hook`] - stdin/stdout envelope
//! - [`notification`] - Title/body/tag formatting per tool
//! - [`ntfy`] - ntfy HTTP client

pub mod approval;
pub mod cleanup;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod hook;
pub mod notification;
pub mod ntfy;

// Re-export commonly used types
pub use cleanup::ExitCleanup;
pub use config::{CliOverrides, Config};
pub use credentials::Credentials;
pub use hook::{Decision, HookInput, HookOutput};
pub use notification::Notification;
pub use ntfy::NtfyClient;
