//! LLM provider implementations.
//!
//! Contains concrete implementations of the [`LlmProvider`] trait defined in
//! `slackgpt-core`.
//!
//! [`LlmProvider`]: slackgpt_core::llm::provider::LlmProvider

pub mod openai_compat;

pub use openai_compat::OpenAiCompatibleProvider;
