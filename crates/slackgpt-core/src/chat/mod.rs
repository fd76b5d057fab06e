//! Direct-message conversations.
//!
//! - `command`: classifies inbound text into commands
//! - `conversation`: per-user history, parameters, and the prompt cycle
//! - `registry`: one conversation per user
//! - `dispatcher`: applies inbound events to the registry

pub mod command;
pub mod conversation;
pub mod dispatcher;
pub mod registry;

pub use command::Command;
pub use conversation::{Conversation, PromptOutcome, SessionServices};
pub use dispatcher::EventDispatcher;
pub use registry::SessionRegistry;
