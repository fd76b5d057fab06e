//! LlmProvider trait definition.
//!
//! This is the completion-service seam every conversation talks through.
//! Uses RPITIT for `complete` so implementations can be plain `async fn`.

use std::future::Future;

use slackgpt_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for completion backends (OpenAI, test doubles).
///
/// Called once per retry attempt. Implementations live in slackgpt-infra
/// (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
