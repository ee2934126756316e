use crate::domain::errors::DomainError;
use async_trait::async_trait;

#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, DomainError>;
    fn model_name(&self) -> &str;
}
