//! Command-line and environment configuration for the `slackgpt` binary.
//!
//! Every option is both a flag and an environment variable. Secrets are
//! parsed as plain strings only long enough to be checked and wrapped in
//! [`SecretString`]; [`Cli`] therefore does not derive Debug.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use secrecy::SecretString;

use slackgpt_observe::LogOptions;
use slackgpt_types::config::{
    SessionConfig, DEFAULT_COMPLETION_RETRIES, DEFAULT_DELIVERY_RETRIES, DEFAULT_PORT,
};
use slackgpt_types::error::ConfigError;
use slackgpt_types::llm::{ModelSpec, DEFAULT_MODEL};

pub const SLACK_BOT_TOKEN_ENV: &str = "SLACK_BOT_TOKEN";
pub const SLACK_SIGN_SECRET_ENV: &str = "SLACK_BOT_SIGN_SECRET";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Chat with an OpenAI model through Slack direct messages.
#[derive(Parser)]
#[command(name = "slackgpt", version, about, long_about = None)]
pub struct Cli {
    /// Slack bot user OAuth token (xoxb-...).
    #[arg(long, env = SLACK_BOT_TOKEN_ENV, hide_env_values = true)]
    pub slack_bot_token: Option<String>,

    /// Slack app signing secret used to verify Events API requests.
    #[arg(long = "slack-sign-secret", env = SLACK_SIGN_SECRET_ENV, hide_env_values = true)]
    pub slack_sign_secret: Option<String>,

    /// OpenAI API key.
    #[arg(long, env = OPENAI_API_KEY_ENV, hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Append log output to this file in addition to stderr.
    #[arg(long, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level or filter directive (RUST_LOG takes precedence).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Completion attempts per prompt.
    #[arg(long = "chat-gpt-retries", env = "CHAT_GPT_ERROR_RETRIES", default_value_t = DEFAULT_COMPLETION_RETRIES)]
    pub chat_gpt_retries: u32,

    /// Delivery attempts per outbound Slack message.
    #[arg(long = "slack-retries", env = "SLACK_ERROR_RETRIES", default_value_t = DEFAULT_DELIVERY_RETRIES)]
    pub slack_retries: u32,

    /// Port for the Events API listener.
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Interface to bind.
    #[arg(long, env = "SLACKGPT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Completion model for new conversations.
    #[arg(long, env = "SLACKGPT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, env = "SLACKGPT_OTEL")]
    pub otel: bool,
}

/// Validated runtime settings.
pub struct Settings {
    pub slack_bot_token: SecretString,
    pub slack_signing_secret: SecretString,
    pub openai_api_key: SecretString,
    pub session: SessionConfig,
    pub listen_addr: SocketAddr,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Cli {
    /// Logging settings; available before the rest of the configuration is
    /// validated so validation failures can be logged.
    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            level: self.log_level.clone(),
            file: self.log_file.clone(),
            otel: self.otel,
        }
    }

    /// Validate and convert into [`Settings`].
    ///
    /// Every missing secret is reported at once.
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        let secrets = (
            non_empty(self.slack_bot_token),
            non_empty(self.slack_sign_secret),
            non_empty(self.openai_api_key),
        );
        let (slack_bot_token, slack_sign_secret, openai_api_key) = match secrets {
            (Some(token), Some(secret), Some(key)) => (token, secret, key),
            (token, secret, key) => {
                let names = [
                    (SLACK_BOT_TOKEN_ENV, token.is_none()),
                    (SLACK_SIGN_SECRET_ENV, secret.is_none()),
                    (OPENAI_API_KEY_ENV, key.is_none()),
                ]
                .into_iter()
                .filter(|(_, missing)| *missing)
                .map(|(name, _)| name.to_string())
                .collect();
                return Err(ConfigError::MissingConfiguration { names });
            }
        };

        let model = ModelSpec::lookup(&self.model)
            .ok_or_else(|| ConfigError::UnknownModel(self.model.clone()))?;

        let ip: IpAddr = self.host.parse().map_err(|e| ConfigError::InvalidValue {
            name: "SLACKGPT_HOST".to_string(),
            reason: format!("{e}"),
        })?;

        Ok(Settings {
            slack_bot_token: SecretString::from(slack_bot_token),
            slack_signing_secret: SecretString::from(slack_sign_secret),
            openai_api_key: SecretString::from(openai_api_key),
            session: SessionConfig {
                model,
                completion_retries: self.chat_gpt_retries.max(1),
                delivery_retries: self.slack_retries.max(1),
            },
            listen_addr: SocketAddr::new(ip, self.port),
        })
    }
}
