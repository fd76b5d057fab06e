//! LLM request/response types for SlackGPT.
//!
//! These types model the data shapes for completion provider interactions:
//! conversation messages, completion requests, the fixed
//! model catalog, and error handling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a message in an LLM conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single message in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request to a completion provider.
///
/// `messages` is the full conversation history, system entries included,
/// in stored order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Response from a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
}

/// Errors from completion provider operations.
///
/// Every variant is treated as a transient completion failure by the
/// conversation retry loop; the distinction only matters for logging.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited")]
    RateLimited,

    #[error("provider overloaded: {0}")]
    Overloaded(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("context length exceeded: {0}")]
    ContextLengthExceeded(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Capacity table: model identifier -> context window in tokens.
const MODEL_CATALOG: &[(&str, u32)] = &[
    ("gpt-3.5-turbo", 4_096),
    ("gpt-4", 8_192),
    ("gpt-4-32k", 32_768),
];

/// Alternative names accepted by [`ModelSpec::lookup`], mapped to their
/// catalog entry.
const MODEL_ALIASES: &[(&str, &str)] = &[("gpt-4-ext", "gpt-4-32k")];

/// Default completion model for new conversations.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// A model known to the capacity table.
///
/// Can only be obtained through [`ModelSpec::lookup`], so holding one
/// proves the model has a capacity entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    name: String,
    capacity: u32,
}

impl ModelSpec {
    /// Look up a model in the capacity table.
    pub fn lookup(name: &str) -> Option<Self> {
        let name = MODEL_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map_or(name, |(_, canonical)| *canonical);
        MODEL_CATALOG
            .iter()
            .find(|(model, _)| *model == name)
            .map(|(model, capacity)| Self {
                name: (*model).to_string(),
                capacity: *capacity,
            })
    }

    /// Names of every model in the capacity table.
    pub fn known_models() -> Vec<&'static str> {
        MODEL_CATALOG.iter().map(|(model, _)| *model).collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed context window of the model, in tokens.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.to_string(),
            capacity: 4_096,
        }
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
