//! SlackClient -- concrete [`MessageSender`] for the Slack Web API.
//!
//! Posts plain-text messages with `chat.postMessage`. The recipient is a
//! user id, which Slack resolves to the bot's direct-message channel with
//! that user.
//!
//! The bot token is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the `Authorization` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use slackgpt_core::messaging::MessageSender;
use slackgpt_types::error::DeliveryError;

/// Default Slack Web API base URL.
pub const SLACK_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl PostMessageResponse {
    fn into_result(self) -> Result<(), DeliveryError> {
        if self.ok {
            Ok(())
        } else {
            Err(DeliveryError::Api(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

/// Slack Web API client.
///
/// Does NOT derive Debug: the bot token must never reach a log line.
pub struct SlackClient {
    http: reqwest::Client,
    bot_token: SecretString,
    api_base: String,
}

impl SlackClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(bot_token: SecretString) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DeliveryError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            bot_token,
            api_base: SLACK_API_BASE.to_string(),
        })
    }

    /// Override the API base URL (useful for testing or proxies).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .http
            .post(format!("{}/chat.postMessage", self.api_base))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&PostMessageRequest { channel, text })
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Api(format!("HTTP {status}")));
        }

        let body: PostMessageResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::InvalidResponse(e.to_string()))?;

        body.into_result()
    }
}

impl MessageSender for SlackClient {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), DeliveryError> {
        tracing::debug!(recipient, chars = text.len(), "posting message");
        self.post_message(recipient, text).await
    }
}
