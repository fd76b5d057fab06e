//! Application state wiring all services together.
//!
//! The core services are generic over the provider and sender traits;
//! AppState pins them to the concrete infra implementations.

use std::sync::Arc;

use secrecy::SecretString;

use slackgpt_core::chat::{EventDispatcher, SessionRegistry, SessionServices};
use slackgpt_core::llm::token_accountant::TokenAccountant;
use slackgpt_infra::llm::OpenAiCompatibleProvider;
use slackgpt_infra::slack::SlackClient;
use slackgpt_infra::tokenizer::TiktokenTokenizer;

use crate::cli::Settings;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteRegistry = SessionRegistry<OpenAiCompatibleProvider, SlackClient>;

pub type ConcreteDispatcher = EventDispatcher<OpenAiCompatibleProvider, SlackClient>;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: ConcreteDispatcher,
    pub signing_secret: Arc<SecretString>,
}

impl AppState {
    /// Wire the adapters and the conversation registry.
    ///
    /// Loads the tokenizer encoding for the configured model up front so an
    /// unusable model fails at startup rather than on the first prompt.
    pub fn init(settings: Settings) -> anyhow::Result<Self> {
        let model = settings.session.model.clone();

        let tokenizer = TiktokenTokenizer::new();
        tokenizer.preload(model.name())?;

        let provider = Arc::new(OpenAiCompatibleProvider::openai(settings.openai_api_key));
        let sender = Arc::new(SlackClient::new(settings.slack_bot_token)?);

        let services = SessionServices::new(
            provider,
            sender,
            TokenAccountant::new(Arc::new(tokenizer)),
            &settings.session,
        );
        let registry: Arc<ConcreteRegistry> = Arc::new(SessionRegistry::new(services));

        tracing::info!(
            model = %model,
            completion_retries = settings.session.completion_retries,
            delivery_retries = settings.session.delivery_retries,
            "services initialized"
        );

        Ok(Self {
            dispatcher: EventDispatcher::new(registry),
            signing_secret: Arc::new(settings.slack_signing_secret),
        })
    }
}
