use rig::providers::openai;

use crate::domain::DomainError;
use crate::infrastructure::config::LlmConfig;

/// Key and endpoint for the OpenAI-compatible API. Clients are built from
/// these values rather than from the process environment, so a missing key
/// is caught when adapters are wired instead of inside a request.
#[derive(Debug, Clone)]
pub struct OpenAiCredentials {
    api_key: String,
    base_url: Option<String>,
}

impl OpenAiCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    /// `None` when no key is configured.
    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        let credentials = Self::new(config.api_key.as_deref()?);
        Some(match &config.base_url {
            Some(base_url) => credentials.with_base_url(base_url.as_str()),
            None => credentials,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub(crate) fn client(&self) -> Result<openai::Client, DomainError> {
        let mut builder: openai::ClientBuilder =
            openai::Client::builder().api_key(self.api_key.as_str());
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url);
        }

        builder
            .build()
            .map_err(|e| DomainError::external(format!("Failed to build OpenAI client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_key() {
        let mut config = LlmConfig::default();
        assert!(OpenAiCredentials::from_config(&config).is_none());

        config.api_key = Some("sk-test".to_string());
        config.base_url = Some("http://localhost:11434/v1".to_string());
        let credentials = OpenAiCredentials::from_config(&config).unwrap();
        assert_eq!(credentials.base_url.as_deref(), Some("http://localhost:11434/v1"));
    }

    #[test]
    fn test_client_builds_without_environment() {
        let credentials = OpenAiCredentials::new("sk-test").with_base_url("http://127.0.0.1:9/v1");
        assert!(credentials.client().is_ok());
    }
}
