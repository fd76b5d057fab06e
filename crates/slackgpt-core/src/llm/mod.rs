//! LLM provider abstractions for SlackGPT.
//!
//! - `LlmProvider`: RPITIT trait for concrete completion backends
//! - `TokenAccountant`: per-model token counting and capacity lookup

pub mod provider;
pub mod token_accountant;
