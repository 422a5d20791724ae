//! Application-wide constants for ntfy-approve.
//!
//! Centralizes timeouts, intervals and formatting limits so the hook's
//! timing behaviour is visible in one place.
//!
//! # Categories
//!
//! - **Timeouts**: HTTP request timeouts per ntfy endpoint
//! - **Polling**: Decision wait loop timing
//! - **Formatting**: Truncation widths for notification text
//! - **ntfy**: Protocol limits and header values

use std::time::Duration;

// ============================================================================
// Timeouts
// ============================================================================

/// Request timeout for publishing the approval notification.
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

/// Request timeout for a single poll of the response topic.
pub const POLL_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Request timeout for deleting the notification during cleanup.
///
/// Kept short because cleanup usually runs after the host already
/// decided to terminate the hook.
pub const DELETE_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Polling
// ============================================================================

/// Default time to wait for a decision from the phone, in seconds.
pub const DEFAULT_DECISION_TIMEOUT_SECS: u64 = 120;

/// Default pause between polls of the response topic, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

// ============================================================================
// Formatting
// ============================================================================

/// Maximum characters of a Bash `description` used in the title.
pub const TITLE_DESCRIPTION_CHARS: usize = 60;

/// Maximum characters of an Edit old/new line shown in the body.
pub const DIFF_LINE_CHARS: usize = 80;

/// Maximum characters of each parameter value for generic tools.
pub const PARAM_VALUE_CHARS: usize = 60;

/// Number of `tool_input` parameters shown for generic tools.
pub const MAX_PARAMS: usize = 3;

// ============================================================================
// ntfy
// ============================================================================

/// ntfy rejects message IDs longer than this.
pub const MAX_MESSAGE_ID_CHARS: usize = 64;

/// Notification priority ("high").
pub const NOTIFICATION_PRIORITY: &str = "4";

/// Tag used for tools without a dedicated emoji.
pub const DEFAULT_TAG: &str = "wrench";
