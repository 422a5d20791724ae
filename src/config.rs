//! Runtime settings for the hook.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Built-in defaults (see [`crate::constants`])
//! 2. Environment variables (`NTFY_CREDENTIALS_FILE`, `NTFY_APPROVE_TIMEOUT`,
//!    `NTFY_APPROVE_POLL_INTERVAL`)
//! 3. Command-line flags
//!
//! Server URL, topics and auth are not settings; they live in the shared
//! credential file (see [`crate::credentials`]).

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::approval::WaitSettings;
use crate::constants::{DEFAULT_DECISION_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_SECS};
use crate::credentials::Credentials;

/// Overrides the credential file location.
pub const ENV_CREDENTIALS_FILE: &str = "NTFY_CREDENTIALS_FILE";
/// Overrides the decision timeout, in seconds.
pub const ENV_TIMEOUT: &str = "NTFY_APPROVE_TIMEOUT";
/// Overrides the poll interval, in seconds.
pub const ENV_POLL_INTERVAL: &str = "NTFY_APPROVE_POLL_INTERVAL";

/// Effective configuration for one hook run.
#[derive(Serialize, Clone, Debug)]
pub struct Config {
    /// Path of the ntfy credential file.
    pub credentials_path: PathBuf,
    /// How long to wait for a decision from the phone, in seconds.
    pub timeout_secs: u64,
    /// Pause between polls of the response topic, in seconds.
    pub poll_interval_secs: u64,
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// `--credentials`
    pub credentials: Option<String>,
    /// `--timeout`
    pub timeout_secs: Option<u64>,
    /// `--poll-interval`
    pub poll_interval_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let credentials_path = Credentials::default_path().unwrap_or_else(|| {
            // Surfaces later as "credential file not found"
            log::warn!("Could not determine home directory for the credential file");
            PathBuf::from(".config/ntfy/credentials")
        });

        Self {
            credentials_path,
            timeout_secs: DEFAULT_DECISION_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl Config {
    /// Defaults, then process environment, then command-line flags.
    pub fn load(cli: &CliOverrides) -> Self {
        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.apply_cli_overrides(cli);
        config
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// Unparseable numbers are ignored, as is a zero poll interval.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(ENV_CREDENTIALS_FILE).filter(|p| !p.is_empty()) {
            self.credentials_path = expand_path(&path);
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT) {
            match timeout.trim().parse::<u64>() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => log::warn!("Ignoring invalid {ENV_TIMEOUT}={timeout:?}"),
            }
        }

        if let Some(interval) = lookup(ENV_POLL_INTERVAL) {
            match interval.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.poll_interval_secs = secs,
                _ => log::warn!("Ignoring invalid {ENV_POLL_INTERVAL}={interval:?}"),
            }
        }
    }

    /// Applies command-line flags.
    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(path) = &cli.credentials {
            self.credentials_path = expand_path(path);
        }
        if let Some(secs) = cli.timeout_secs {
            self.timeout_secs = secs;
        }
        if let Some(secs) = cli.poll_interval_secs.filter(|s| *s > 0) {
            self.poll_interval_secs = secs;
        }
    }

    /// Timing for the decision wait loop.
    pub fn wait_settings(&self) -> WaitSettings {
        WaitSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }
}

/// Expands `~` and `$VARS`; falls back to tilde-only expansion when a
/// variable is undefined.
fn expand_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::full(raw).unwrap_or_else(|_| shellexpand::tilde(raw));
    PathBuf::from(expanded.as_ref())
}
