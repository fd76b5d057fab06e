//! Shared test doubles for the chat modules.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use slackgpt_types::config::SessionConfig;
use slackgpt_types::error::{DeliveryError, TokenizerError};
use slackgpt_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use crate::chat::conversation::SessionServices;
use crate::llm::provider::LlmProvider;
use crate::llm::token_accountant::{TokenAccountant, Tokenizer};
use crate::messaging::MessageSender;

#[derive(Clone)]
enum Behavior {
    Reply(String),
    Fail(String),
    /// Fail the first `failures` calls, then reply.
    Flaky { failures: u32, reply: String },
}

/// Completion provider with scripted behavior.
pub struct MockProvider {
    behavior: Behavior,
    gate: Option<Arc<Notify>>,
    calls: AtomicU32,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockProvider {
    fn with(behavior: Behavior, gate: Option<Arc<Notify>>) -> Self {
        Self {
            behavior,
            gate,
            calls: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::with(Behavior::Reply(text.to_string()), None)
    }

    pub fn failing(message: &str) -> Self {
        Self::with(Behavior::Fail(message.to_string()), None)
    }

    pub fn flaky(failures: u32, reply: &str) -> Self {
        Self::with(
            Behavior::Flaky {
                failures,
                reply: reply.to_string(),
            },
            None,
        )
    }

    /// Replies only after the returned gate is notified.
    pub fn gated(text: &str) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self::with(Behavior::Reply(text.to_string()), Some(Arc::clone(&gate))),
            gate,
        )
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }

    /// Yield until `complete` has been called at least `n` times.
    pub async fn wait_for_calls(&self, n: u32) {
        while self.calls() < n {
            tokio::task::yield_now().await;
        }
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_request.lock().unwrap() = Some(request.clone());
        let behavior = self.behavior.clone();
        let gate = self.gate.clone();

        async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            let reply = match behavior {
                Behavior::Reply(text) => text,
                Behavior::Fail(message) => return Err(LlmError::Provider { message }),
                Behavior::Flaky { failures, reply } => {
                    if call <= failures {
                        return Err(LlmError::Overloaded(format!("attempt {call}")));
                    }
                    reply
                }
            };
            Ok(CompletionResponse { content: reply })
        }
    }
}

/// Records every delivered message.
#[derive(Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    gate: Option<Arc<Notify>>,
}

impl RecordingSender {
    /// Each send blocks until the returned `Notify` is signalled, and is
    /// recorded only after that.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let sender = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (sender, gate)
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
    }
}

impl MessageSender for RecordingSender {
    fn send(
        &self,
        recipient: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send {
        let sent = Arc::clone(&self.sent);
        let gate = self.gate.clone();
        let entry = (recipient.to_string(), text.to_string());
        async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            sent.lock().unwrap().push(entry);
            Ok(())
        }
    }
}

/// One token per whitespace-separated word.
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn count(&self, _model: &str, text: &str) -> Result<usize, TokenizerError> {
        Ok(text.split_whitespace().count())
    }
}

pub fn test_services(
    provider: Arc<MockProvider>,
    sender: Arc<RecordingSender>,
    completion_retries: u32,
) -> SessionServices<MockProvider, RecordingSender> {
    let config = SessionConfig {
        completion_retries,
        ..SessionConfig::default()
    };
    SessionServices::new(
        provider,
        sender,
        TokenAccountant::new(Arc::new(WordTokenizer)),
        &config,
    )
}
