//! Token accounting for conversation histories.
//!
//! Counts the tokens of every stored message (system, user, and assistant
//! entries alike) with the tokenizer of the conversation's model, and pairs
//! the total with the model's fixed context window.

use std::fmt;
use std::sync::Arc;

use slackgpt_types::error::TokenizerError;
use slackgpt_types::llm::{ChatMessage, ModelSpec};

/// Counts tokens of a text for a given model.
///
/// Implemented in slackgpt-infra with tiktoken encodings.
pub trait Tokenizer: Send + Sync {
    fn count(&self, model: &str, text: &str) -> Result<usize, TokenizerError>;
}

/// Current token count of a history against the model's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub current: usize,
    pub capacity: u32,
}

impl fmt::Display for TokenUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.capacity)
    }
}

/// Sums per-message token counts for a model.
#[derive(Clone)]
pub struct TokenAccountant {
    tokenizer: Arc<dyn Tokenizer>,
}

impl TokenAccountant {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }

    /// Total tokens across every message content in `history`.
    pub fn count_tokens(
        &self,
        model: &ModelSpec,
        history: &[ChatMessage],
    ) -> Result<usize, TokenizerError> {
        history
            .iter()
            .map(|message| self.tokenizer.count(model.name(), &message.content))
            .sum()
    }

    /// Fixed context window of `model`.
    pub fn capacity_of(&self, model: &ModelSpec) -> u32 {
        model.capacity()
    }

    /// Token count of `history` paired with the model capacity.
    pub fn usage(
        &self,
        model: &ModelSpec,
        history: &[ChatMessage],
    ) -> Result<TokenUsage, TokenizerError> {
        Ok(TokenUsage {
            current: self.count_tokens(model, history)?,
            capacity: self.capacity_of(model),
        })
    }
}
