use thiserror::Error;

/// Errors raised while loading process configuration.
///
/// All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .names.join(", "))]
    MissingConfiguration { names: Vec<String> },

    #[error("unknown model '{0}'")]
    UnknownModel(String),

    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Errors from the message-delivery service.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("api error: {0}")]
    Api(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors from tokenizer lookups.
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("no tokenizer available for model '{0}'")]
    UnsupportedModel(String),
}

/// A user-supplied conversation setting could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingError {
    #[error("invalid value for {setting}: '{input}'")]
    InvalidValue { setting: &'static str, input: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_configuration_lists_every_name() {
        let err = ConfigError::MissingConfiguration {
            names: vec!["SLACK_BOT_TOKEN".to_string(), "OPENAI_API_KEY".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing required configuration: SLACK_BOT_TOKEN, OPENAI_API_KEY"
        );
    }

    #[test]
    fn test_delivery_error_display() {
        let err = DeliveryError::Api("channel_not_found".to_string());
        assert_eq!(err.to_string(), "api error: channel_not_found");
    }

    #[test]
    fn test_setting_error_display() {
        let err = SettingError::InvalidValue {
            setting: "temperature",
            input: "warm".to_string(),
        };
        assert!(err.to_string().contains("temperature"));
        assert!(err.to_string().contains("warm"));
    }
}
