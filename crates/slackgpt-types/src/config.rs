//! Runtime configuration types for SlackGPT sessions.
//!
//! `SessionConfig` is the explicit configuration value handed to the
//! session registry at construction; nothing reads process-wide settings
//! after startup.

use crate::llm::ModelSpec;

/// Default number of completion attempts per prompt.
pub const DEFAULT_COMPLETION_RETRIES: u32 = 3;

/// Default number of delivery attempts per outbound message.
pub const DEFAULT_DELIVERY_RETRIES: u32 = 3;

/// Default port for the Events API listener.
pub const DEFAULT_PORT: u16 = 3000;

/// Settings shared by every conversation the registry creates.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Completion model (and tokenizer/capacity entry) for new conversations.
    pub model: ModelSpec,
    /// Attempt limit for completion calls.
    pub completion_retries: u32,
    /// Attempt limit for message-delivery calls.
    pub delivery_retries: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: ModelSpec::default(),
            completion_retries: DEFAULT_COMPLETION_RETRIES,
            delivery_retries: DEFAULT_DELIVERY_RETRIES,
        }
    }
}
