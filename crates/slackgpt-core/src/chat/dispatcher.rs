//! Routes inbound message events to conversation operations.

use std::sync::Arc;

use slackgpt_types::chat::InboundEvent;

use crate::llm::provider::LlmProvider;
use crate::messaging::MessageSender;

use super::command::Command;
use super::conversation::Conversation;
use super::registry::SessionRegistry;

/// Classifies direct messages and applies them to the sender's conversation.
///
/// Cheap to clone; each inbound event is expected to run in its own task.
pub struct EventDispatcher<P, M> {
    registry: Arc<SessionRegistry<P, M>>,
}

impl<P, M> Clone for EventDispatcher<P, M> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<P: LlmProvider, M: MessageSender> EventDispatcher<P, M> {
    pub fn new(registry: Arc<SessionRegistry<P, M>>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry<P, M>> {
        &self.registry
    }

    /// Handle one message event.
    ///
    /// Returns the command that was applied, or `None` when the event was
    /// not a direct message and got dropped.
    pub async fn handle(&self, event: InboundEvent) -> Option<Command> {
        if !event.is_direct_message() {
            tracing::debug!(
                user = %event.user,
                channel_type = %event.channel_type,
                "ignoring message outside a direct-message channel"
            );
            return None;
        }

        let command = Command::parse(&event.text);
        tracing::debug!(user = %event.user, command = command.label(), "dispatching");

        match &command {
            Command::Start => {
                self.registry.restart(&event.user, &event.channel).await;
            }
            Command::End => {
                self.registry.end(&event.user).await;
            }
            Command::SetSystemRole(content) => {
                self.conversation(&event).await.set_system_role(content).await;
            }
            // Rejected values are reported to the user by the conversation.
            Command::SetTemperature(raw) => {
                let _ = self.conversation(&event).await.set_temperature(raw).await;
            }
            Command::SetMaxTokens(raw) => {
                let _ = self.conversation(&event).await.set_max_tokens(raw).await;
            }
            Command::GetSettings => {
                self.conversation(&event).await.post_settings().await;
            }
            Command::Prompt(text) => {
                self.conversation(&event).await.submit_prompt(text).await;
            }
        }

        Some(command)
    }

    async fn conversation(&self, event: &InboundEvent) -> Arc<Conversation<P, M>> {
        self.registry.get_or_create(&event.user, &event.channel).await
    }
}
