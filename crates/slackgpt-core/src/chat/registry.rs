//! Per-user conversation registry.
//!
//! At most one conversation exists per user. Lookups and removals go
//! through `DashMap`'s entry API so get-or-create is atomic; no map guard
//! is ever held across an `.await`.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::llm::provider::LlmProvider;
use crate::messaging::MessageSender;

use super::conversation::{Conversation, SessionServices};

/// Owns every active conversation, keyed by user id.
pub struct SessionRegistry<P, M> {
    sessions: DashMap<String, Arc<Conversation<P, M>>>,
    services: SessionServices<P, M>,
}

impl<P: LlmProvider, M: MessageSender> SessionRegistry<P, M> {
    pub fn new(services: SessionServices<P, M>) -> Self {
        Self {
            sessions: DashMap::new(),
            services,
        }
    }

    /// Return the user's conversation, creating one if absent.
    ///
    /// A newly created conversation posts the start banner before it is
    /// returned to any caller, including callers racing the creator.
    pub async fn get_or_create(&self, user: &str, channel: &str) -> Arc<Conversation<P, M>> {
        let (conversation, created) = match self.sessions.entry(user.to_string()) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let conversation =
                    Arc::new(Conversation::new(user, channel, self.services.clone()));
                entry.insert(Arc::clone(&conversation));
                (conversation, true)
            }
        };

        if created {
            tracing::info!(user, channel, model = %conversation.model(), "conversation created");
        }
        conversation.ensure_started().await;
        conversation
    }

    /// Remove the user's conversation and post the finish banner.
    ///
    /// Returns `false` (and sends nothing) when no conversation exists.
    pub async fn end(&self, user: &str) -> bool {
        let Some((_, conversation)) = self.sessions.remove(user) else {
            tracing::debug!(user, "end requested without a conversation");
            return false;
        };

        tracing::info!(user, "conversation finished");
        conversation.finish().await;
        true
    }

    /// End any existing conversation, then create a fresh one.
    pub async fn restart(&self, user: &str, channel: &str) -> Arc<Conversation<P, M>> {
        self.end(user).await;
        self.get_or_create(user, channel).await
    }

    pub fn get(&self, user: &str) -> Option<Arc<Conversation<P, M>>> {
        self.sessions.get(user).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, user: &str) -> bool {
        self.sessions.contains_key(user)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
