//! MessageSender trait definition.

use std::future::Future;

use slackgpt_types::error::DeliveryError;

/// Trait for message-delivery backends (Slack Web API, test doubles).
///
/// Called once per delivery attempt for every outbound notification.
pub trait MessageSender: Send + Sync {
    /// Deliver `text` to `recipient` (a user or channel identifier).
    fn send(
        &self,
        recipient: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}
