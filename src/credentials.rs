//! ntfy credential file loading.
//!
//! Credentials live in a flat `KEY=VALUE` file shared with other ntfy
//! tooling, by default `~/.config/ntfy/credentials`:
//!
//! ```text
//! # ntfy server reachable from this machine
//! NTFY_SERVER=https://ntfy.example.com
//! # URL the phone uses when an action button is tapped (optional)
//! NTFY_TAILSCALE_URL=https://ntfy.tail1234.ts.net
//! NTFY_USER=alice
//! NTFY_PASS=hunter2
//! NTFY_TOPIC_APPROVE=agent-approve
//! NTFY_TOPIC_RESPONSE=agent-response
//! ```
//!
//! The password never appears in `Debug` output or serialized config.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const KEY_SERVER: &str = "NTFY_SERVER";
const KEY_TAILSCALE_URL: &str = "NTFY_TAILSCALE_URL";
const KEY_USER: &str = "NTFY_USER";
const KEY_PASS: &str = "NTFY_PASS";
const KEY_TOPIC_APPROVE: &str = "NTFY_TOPIC_APPROVE";
const KEY_TOPIC_RESPONSE: &str = "NTFY_TOPIC_RESPONSE";

/// Categorized credential loading errors.
#[derive(Debug)]
pub enum CredentialsError {
    /// The credential file does not exist.
    NotFound(PathBuf),
    /// The file exists but could not be read.
    Unreadable {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A required key is absent or empty.
    MissingKey(&'static str),
}

impl std::fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "Credential file not found: {}", path.display()),
            Self::Unreadable { path, source } => {
                write!(f, "Could not read {}: {source}", path.display())
            }
            Self::MissingKey(key) => write!(f, "Credential file is missing {key}"),
        }
    }
}

impl std::error::Error for CredentialsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Connection details for the ntfy server.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Base URL used by this machine to publish, poll and delete.
    pub server: String,
    /// Base URL the phone uses to post a decision back.
    ///
    /// Falls back to `server` when `NTFY_TAILSCALE_URL` is not set.
    pub tailscale_url: String,
    /// Basic auth user name.
    pub user: String,
    /// Basic auth password - NOT serialized.
    #[serde(skip)]
    password: String,
    /// Topic approval prompts are published to.
    pub topic_approve: String,
    /// Topic the phone posts decisions to.
    pub topic_response: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("server", &self.server)
            .field("tailscale_url", &self.tailscale_url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("topic_approve", &self.topic_approve)
            .field("topic_response", &self.topic_response)
            .finish()
    }
}

impl Credentials {
    /// Default credential file location: `~/.config/ntfy/credentials`.
    ///
    /// Deliberately not `dirs::config_dir()`, which resolves to
    /// `~/Library/Application Support` on macOS.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("ntfy").join("credentials"))
    }

    /// Reads and parses the credential file at `path`.
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                CredentialsError::NotFound(path.to_path_buf())
            } else {
                CredentialsError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::parse(&content)
    }

    /// Parses credential file contents.
    pub fn parse(content: &str) -> Result<Self, CredentialsError> {
        let mut entries = parse_entries(content);
        let mut take = |key: &'static str| {
            entries
                .remove(key)
                .filter(|v| !v.is_empty())
                .ok_or(CredentialsError::MissingKey(key))
        };

        let server = trim_url(&take(KEY_SERVER)?);
        let user = take(KEY_USER)?;
        let password = take(KEY_PASS)?;
        let topic_approve = take(KEY_TOPIC_APPROVE)?;
        let topic_response = take(KEY_TOPIC_RESPONSE)?;
        let tailscale_url = take(KEY_TAILSCALE_URL).map_or_else(|_| server.clone(), |u| trim_url(&u));

        Ok(Self {
            server,
            tailscale_url,
            user,
            password,
            topic_approve,
            topic_response,
        })
    }

    /// `Authorization` header value for HTTP Basic auth.
    pub fn auth_header(&self) -> String {
        let token = BASE64.encode(format!("{}:{}", self.user, self.password));
        format!("Basic {token}")
    }
}

/// Splits `KEY=VALUE` lines, skipping blanks and `#` comments.
///
/// Only the first `=` separates key from value; later duplicates win.
fn parse_entries(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| match line.split_once('=') {
            Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
            None => (line.to_string(), String::new()),
        })
        .collect()
}

fn trim_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
