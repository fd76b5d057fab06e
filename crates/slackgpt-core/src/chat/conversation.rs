//! Per-user conversation: message history, generation parameters, and the
//! prompt/response cycle.
//!
//! A conversation is `Idle` or `Busy`. The busy flag is an `AtomicBool`
//! flipped with `compare_exchange`, so two concurrent prompts for the same
//! user can never both start a cycle. History and parameters live behind a
//! `tokio::sync::Mutex` that is only held for in-memory mutation, never
//! across a call to an external service. A cycle works on a snapshot of the
//! history taken when the prompt was accepted; parameter or system-role
//! changes made while it is in flight apply to the next prompt.

use std::fmt;
use std::num::IntErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use slackgpt_types::config::SessionConfig;
use slackgpt_types::error::SettingError;
use slackgpt_types::llm::{ChatMessage, CompletionRequest, MessageRole, ModelSpec};

use crate::llm::provider::LlmProvider;
use crate::llm::token_accountant::{TokenAccountant, TokenUsage};
use crate::messaging::{MessageSender, Notifier};
use crate::retry::RetryPolicy;

pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const MIN_MAX_TOKENS: i64 = 5;
pub const MAX_MAX_TOKENS: i64 = 4000;

pub const DEFAULT_TEMPERATURE: f64 = 1.0;
pub const MIN_TEMPERATURE: f64 = 0.0;
pub const MAX_TEMPERATURE: f64 = 2.0;

pub const STARTED_BANNER: &str = "> New Conversation Started";
pub const FINISHED_BANNER: &str = "> Conversation Finished";
pub const BUSY_NOTICE: &str = "Please wait until your previous prompt is finished";

fn usage_notice(usage: TokenUsage) -> String {
    format!(
        "token_usage: {usage} (+ Number of tokens in the answer, \
         decrease max_tokens if problems occurs)"
    )
}

fn completion_failure_notice(error: &impl fmt::Display) -> String {
    format!("Sorry, We were unable to reach the ChatGPT service; GptError={error}")
}

fn invalid_value_notice(setting: &str, input: &str) -> String {
    format!("Unable to set {setting}, invalid value: {input}")
}

// ---------------------------------------------------------------------------
// SessionServices
// ---------------------------------------------------------------------------

/// External collaborators and settings shared by every conversation.
pub struct SessionServices<P, M> {
    pub provider: Arc<P>,
    pub notifier: Notifier<M>,
    pub accountant: TokenAccountant,
    pub completion_policy: RetryPolicy,
    pub model: ModelSpec,
}

impl<P, M> Clone for SessionServices<P, M> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            notifier: self.notifier.clone(),
            accountant: self.accountant.clone(),
            completion_policy: self.completion_policy,
            model: self.model.clone(),
        }
    }
}

impl<P: LlmProvider, M: MessageSender> SessionServices<P, M> {
    /// Wire services from explicit configuration.
    pub fn new(
        provider: Arc<P>,
        sender: Arc<M>,
        accountant: TokenAccountant,
        config: &SessionConfig,
    ) -> Self {
        Self {
            provider,
            notifier: Notifier::new(sender, RetryPolicy::new(config.delivery_retries)),
            accountant,
            completion_policy: RetryPolicy::new(config.completion_retries),
            model: config.model.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversation state
// ---------------------------------------------------------------------------

/// Result of a prompt submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    /// A cycle was already in flight; nothing changed.
    Busy,
    /// The completion succeeded and the reply was appended.
    Answered,
    /// Every completion attempt failed; the user turn stays in history.
    Failed,
}

/// Snapshot of the user-visible settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSettings {
    /// System-role contents in stored order (most recent first).
    pub system_roles: Vec<String>,
    pub usage: Option<TokenUsage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl fmt::Display for ConversationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (token_count, max_token_count) = match self.usage {
            Some(usage) => (usage.current.to_string(), usage.capacity.to_string()),
            None => ("unknown".to_string(), "unknown".to_string()),
        };
        write!(
            f,
            "sys_content={:?}, token_count={token_count}, max_token_count={max_token_count}, \
             temperature={:?}, max_tokens={}",
            self.system_roles, self.temperature, self.max_tokens
        )
    }
}

#[derive(Debug)]
struct ConversationState {
    history: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Holds the busy flag for the duration of one cycle.
///
/// Dropping the guard returns the conversation to `Idle`, including when the
/// cycle future is dropped or panics.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    /// Atomically move `Idle -> Busy`; `None` if already busy.
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// One user's dialogue with the completion model.
pub struct Conversation<P, M> {
    user: String,
    channel: String,
    services: SessionServices<P, M>,
    in_flight: AtomicBool,
    started: OnceCell<()>,
    state: Mutex<ConversationState>,
}

impl<P: LlmProvider, M: MessageSender> Conversation<P, M> {
    pub fn new(
        user: impl Into<String>,
        channel: impl Into<String>,
        services: SessionServices<P, M>,
    ) -> Self {
        Self {
            user: user.into(),
            channel: channel.into(),
            services,
            in_flight: AtomicBool::new(false),
            started: OnceCell::new(),
            state: Mutex::new(ConversationState::default()),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn model(&self) -> &ModelSpec {
        &self.services.model
    }

    /// Whether a prompt/response cycle is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Copy of the current history.
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.state.lock().await.history.clone()
    }

    pub async fn temperature(&self) -> f64 {
        self.state.lock().await.temperature
    }

    pub async fn max_tokens(&self) -> u32 {
        self.state.lock().await.max_tokens
    }

    /// Deliver `text` to the conversation's user.
    pub async fn post_message(&self, text: &str) -> bool {
        self.services.notifier.notify(&self.user, text).await
    }

    pub async fn start(&self) {
        self.post_message(STARTED_BANNER).await;
    }

    /// Post the start banner exactly once. Concurrent callers wait until it
    /// has been delivered.
    pub(crate) async fn ensure_started(&self) {
        self.started.get_or_init(|| self.start()).await;
    }

    pub async fn finish(&self) {
        self.post_message(FINISHED_BANNER).await;
    }

    /// Run one prompt/response cycle.
    pub async fn submit_prompt(&self, text: &str) -> PromptOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::info!(user = %self.user, "prompt rejected, previous prompt in progress");
            self.post_message(BUSY_NOTICE).await;
            return PromptOutcome::Busy;
        };

        let request = {
            let mut state = self.state.lock().await;
            state.history.push(ChatMessage::user(text));
            CompletionRequest {
                model: self.services.model.name().to_string(),
                messages: state.history.clone(),
                max_tokens: state.max_tokens,
                temperature: state.temperature,
            }
        };

        match self.services.accountant.usage(&self.services.model, &request.messages) {
            Ok(usage) => {
                tracing::info!(
                    user = %self.user,
                    text,
                    token_count = usage.current,
                    max_token_count = usage.capacity,
                    "prompt inserted"
                );
                self.post_message(&usage_notice(usage)).await;
            }
            Err(e) => {
                tracing::warn!(user = %self.user, error = %e, "token count unavailable");
            }
        }

        let provider = &self.services.provider;
        let result = self
            .services
            .completion_policy
            .run("chat.completions", |_| provider.complete(&request))
            .await;

        match result {
            Ok(response) => {
                tracing::info!(
                    user = %self.user,
                    provider = provider.name(),
                    text = %response.content,
                    "completion response"
                );
                self.state
                    .lock()
                    .await
                    .history
                    .push(ChatMessage::assistant(response.content.clone()));
                self.post_message(&response.content).await;
                PromptOutcome::Answered
            }
            Err(exhausted) => {
                tracing::error!(
                    user = %self.user,
                    attempts = exhausted.attempts,
                    error = %exhausted.last_error,
                    "unable to prompt completion service, max retries reached"
                );
                self.post_message(&completion_failure_notice(&exhausted.last_error))
                    .await;
                PromptOutcome::Failed
            }
        }
    }

    /// Insert system-role content at the front of the history.
    ///
    /// Repeated calls stack in reverse order: the newest content comes first.
    /// Allowed while a cycle is in flight.
    pub async fn set_system_role(&self, text: &str) {
        self.state
            .lock()
            .await
            .history
            .insert(0, ChatMessage::system(text));
        tracing::info!(user = %self.user, content = text, "system content added");
    }

    /// Parse, clamp to `[0, 2]`, and store the temperature.
    ///
    /// Unparseable input or NaN leaves the value unchanged and notifies the
    /// user. Out-of-range values, infinities included, are clamped.
    pub async fn set_temperature(&self, raw: &str) -> Result<f64, SettingError> {
        let parsed = raw.parse::<f64>().ok().filter(|t| !t.is_nan());
        let Some(value) = parsed else {
            return Err(self.reject_setting("temperature", raw).await);
        };

        let temperature = value.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        self.state.lock().await.temperature = temperature;
        tracing::info!(user = %self.user, temperature, "temperature set");
        Ok(temperature)
    }

    /// Parse, clamp to `[5, 4000]`, and store the completion token limit.
    ///
    /// Integers too large for `i64` still clamp to the nearest bound.
    pub async fn set_max_tokens(&self, raw: &str) -> Result<u32, SettingError> {
        let value = match raw.parse::<i64>() {
            Ok(value) => value,
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => MAX_MAX_TOKENS,
            Err(e) if *e.kind() == IntErrorKind::NegOverflow => MIN_MAX_TOKENS,
            Err(_) => return Err(self.reject_setting("max tokens", raw).await),
        };

        // Clamped into [5, 4000], so the narrowing cast is lossless.
        let max_tokens = value.clamp(MIN_MAX_TOKENS, MAX_MAX_TOKENS) as u32;
        self.state.lock().await.max_tokens = max_tokens;
        tracing::info!(user = %self.user, max_tokens, "max tokens set");
        Ok(max_tokens)
    }

    async fn reject_setting(&self, setting: &'static str, raw: &str) -> SettingError {
        tracing::info!(user = %self.user, setting, value = raw, "unable to set value");
        self.post_message(&invalid_value_notice(setting, raw)).await;
        SettingError::InvalidValue {
            setting,
            input: raw.to_string(),
        }
    }

    /// Snapshot the current settings without mutating anything.
    pub async fn settings(&self) -> ConversationSettings {
        let state = self.state.lock().await;
        let system_roles = state
            .history
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.clone())
            .collect();
        let usage = self
            .services
            .accountant
            .usage(&self.services.model, &state.history)
            .ok();

        ConversationSettings {
            system_roles,
            usage,
            temperature: state.temperature,
            max_tokens: state.max_tokens,
        }
    }

    /// Deliver the settings summary as one notification.
    pub async fn post_settings(&self) {
        let summary = self.settings().await.to_string();
        self.post_message(&summary).await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
