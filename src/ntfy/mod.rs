//! ntfy HTTP client.
//!
//! Three endpoints of the ntfy API are used:
//!
//! - `POST /<approve topic>` publishes the approval prompt with Approve/Deny
//!   action buttons and a caller-chosen message ID
//! - `GET /<response topic>/json?poll=1&since=<unix>` fetches replies
//! - `DELETE /<approve topic>/<message id>` removes the prompt from the phone
//!   when the terminal answered first
//!
//! # Modules
//!
//! - [`actions`] - Action button header and the decision payload
//! - [`stream`] - Poll response parsing

pub mod actions;
pub mod stream;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, AUTHORIZATION};

use crate::constants::{
    DELETE_TIMEOUT, MAX_MESSAGE_ID_CHARS, NOTIFICATION_PRIORITY, POLL_REQUEST_TIMEOUT,
    PUBLISH_TIMEOUT,
};
use crate::credentials::Credentials;
use crate::notification::{truncate_chars, Notification};

pub use actions::DecisionPayload;
pub use stream::Reply;

/// Blocking client for one ntfy server and topic pair.
#[derive(Debug, Clone)]
pub struct NtfyClient {
    client: Client,
    credentials: Credentials,
    auth: String,
}

impl NtfyClient {
    /// Creates a client for the server described by `credentials`.
    pub fn new(credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ntfy-approve/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        let auth = credentials.auth_header();
        Ok(Self {
            client,
            credentials,
            auth,
        })
    }

    /// Credentials this client was built from.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn topic_url(&self, topic: &str) -> String {
        format!("{}/{}", self.credentials.server, topic)
    }

    /// Publishes the approval prompt and returns its ntfy message ID.
    ///
    /// The message ID is derived from `correlation_id` so the prompt can be
    /// deleted later without parsing the publish response.
    pub fn publish(&self, notification: &Notification, correlation_id: &str) -> Result<String> {
        let message_id = truncate_chars(correlation_id, MAX_MESSAGE_ID_CHARS).to_string();
        let response_url = format!(
            "{}/{}",
            self.credentials.tailscale_url, self.credentials.topic_response
        );
        let actions = actions::approval_actions(&response_url, &self.auth, correlation_id)?;

        // Titles carry UTF-8 (project separator, descriptions); from_bytes
        // accepts non-ASCII where from_str would not.
        let title = HeaderValue::from_bytes(notification.title.as_bytes())
            .context("Notification title is not a valid header value")?;
        let actions = HeaderValue::from_str(&actions)
            .context("Actions are not a valid header value")?;
        let message_id_header = HeaderValue::from_str(&message_id)
            .context("Tool use id is not a valid message ID")?;

        let url = self.topic_url(&self.credentials.topic_approve);
        self.client
            .post(&url)
            .timeout(PUBLISH_TIMEOUT)
            .header(AUTHORIZATION, &self.auth)
            .header("Title", title)
            .header("Priority", NOTIFICATION_PRIORITY)
            .header("Tags", notification.tag)
            .header("Actions", actions)
            .header("X-Id", message_id_header)
            .body(notification.body.clone())
            .send()
            .with_context(|| format!("Failed to publish to {url}"))?
            .error_for_status()
            .context("ntfy rejected the notification")?;

        log::info!(
            "Published approval prompt {} to topic {}",
            message_id,
            self.credentials.topic_approve
        );
        Ok(message_id)
    }

    /// Deletes a published prompt from the phone. Failures are logged and ignored.
    pub fn delete(&self, message_id: &str) {
        let url = format!("{}/{}", self.topic_url(&self.credentials.topic_approve), message_id);
        let result = self
            .client
            .delete(&url)
            .timeout(DELETE_TIMEOUT)
            .header(AUTHORIZATION, &self.auth)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status);

        match result {
            Ok(_) => log::info!("Deleted approval prompt {message_id}"),
            Err(e) => log::warn!("Failed to delete approval prompt {message_id}: {e}"),
        }
    }

    /// Polls the response topic once for a reply to `correlation_id`.
    ///
    /// `since` is a unix timestamp in seconds; older replies are not fetched.
    pub fn poll(&self, since: i64, correlation_id: &str) -> Result<Option<Reply>> {
        let url = format!("{}/json", self.topic_url(&self.credentials.topic_response));
        let body = self
            .client
            .get(&url)
            .timeout(POLL_REQUEST_TIMEOUT)
            .query(&[("poll", "1".to_string()), ("since", since.to_string())])
            .header(AUTHORIZATION, &self.auth)
            .send()
            .with_context(|| format!("Failed to poll {url}"))?
            .error_for_status()
            .context("ntfy rejected the poll")?
            .text()
            .context("Failed to read poll response")?;

        Ok(stream::find_reply(&body, correlation_id))
    }
}
