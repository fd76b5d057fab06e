//! Inbound chat event types for SlackGPT.
//!
//! An [`InboundEvent`] is the platform-neutral shape of a message event
//! after the ingestion layer has parsed and authenticated it.

use serde::{Deserialize, Serialize};

/// Channel type marking a private one-to-one conversation.
pub const DIRECT_MESSAGE_CHANNEL_TYPE: &str = "im";

/// A message event delivered by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub user: String,
    pub channel: String,
    pub channel_type: String,
    pub text: String,
}

impl InboundEvent {
    pub fn new(
        user: impl Into<String>,
        channel: impl Into<String>,
        channel_type: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            channel: channel.into(),
            channel_type: channel_type.into(),
            text: text.into(),
        }
    }

    /// Whether the event was posted in a direct-message channel.
    pub fn is_direct_message(&self) -> bool {
        self.channel_type == DIRECT_MESSAGE_CHANNEL_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_direct_message() {
        assert!(InboundEvent::new("U1", "D1", "im", "hi").is_direct_message());
        assert!(!InboundEvent::new("U1", "C1", "channel", "hi").is_direct_message());
        assert!(!InboundEvent::new("U1", "G1", "mpim", "hi").is_direct_message());
    }
}
