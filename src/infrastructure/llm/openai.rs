use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use std::time::Duration;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::LlmConfig;
use crate::infrastructure::openai_client::OpenAiCredentials;

/// Chat completions against an OpenAI-compatible endpoint.
pub struct OpenAiLlm {
    credentials: OpenAiCredentials,
    model: String,
    timeout: Duration,
}

impl OpenAiLlm {
    pub fn new(credentials: OpenAiCredentials, model: impl Into<String>) -> Self {
        Self {
            credentials,
            model: model.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        let credentials = OpenAiCredentials::from_config(config)?;
        Some(
            Self::new(credentials, config.model.clone())
                .with_timeout(Duration::from_secs(config.timeout_seconds)),
        )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl LlmService for OpenAiLlm {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, DomainError> {
        let client = self.credentials.client()?;
        let agent = client.agent(&self.model).preamble(system).build();

        tokio::time::timeout(self.timeout, agent.prompt(prompt))
            .await
            .map_err(|_| DomainError::timeout("Completion request timed out"))?
            .map_err(|e| DomainError::external(e.to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
