//! Infrastructure layer for SlackGPT.
//!
//! Contains implementations of the service traits defined in `slackgpt-core`:
//! the OpenAI chat completion provider, the Slack Web API sender, and the
//! tiktoken tokenizer, plus Slack request-signature verification.

pub mod llm;
pub mod slack;
pub mod tokenizer;
