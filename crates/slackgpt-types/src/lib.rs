//! Shared domain types for SlackGPT.
//!
//! This crate contains the core domain types used across the SlackGPT bot:
//! chat events, conversation messages, completion requests, the model
//! catalog, session configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
