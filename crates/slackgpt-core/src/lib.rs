//! Session state machine, command routing, and service traits for SlackGPT.
//!
//! This crate defines the "ports" (completion provider, message sender,
//! tokenizer) that the infrastructure layer implements. It depends only on
//! `slackgpt-types` -- never on `slackgpt-infra` or any network crate.

pub mod chat;
pub mod llm;
pub mod messaging;
pub mod retry;

#[cfg(test)]
mod test_support;
