//! Connection settings for OpenAI-compatible chat completion endpoints.

use secrecy::SecretString;

/// Default base URL of the OpenAI API.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for an [`super::OpenAiCompatibleProvider`].
///
/// Does NOT derive Debug: the API key must never reach a log line.
pub struct OpenAiCompatConfig {
    /// Human-readable provider name used in log fields.
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    /// API key for bearer authentication.
    pub api_key: SecretString,
}

/// OpenAI default configuration.
pub fn openai_defaults(api_key: SecretString) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: OPENAI_BASE_URL.into(),
        api_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_openai_defaults() {
        let config = openai_defaults(SecretString::from("sk-test".to_string()));
        assert_eq!(config.provider_name, "openai");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.api_key.expose_secret(), "sk-test");
    }
}
