//! Outbound message delivery.
//!
//! - `MessageSender`: RPITIT trait for the chat platform's send call
//! - `Notifier`: wraps a sender with the delivery retry policy

pub mod notifier;
pub mod sender;

pub use notifier::Notifier;
pub use sender::MessageSender;
