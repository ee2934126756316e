use async_trait::async_trait;
use rig::client::EmbeddingsClient;
use rig::embeddings::EmbeddingsBuilder;
use std::time::Duration;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::{EmbeddingConfig, EmbeddingProvider};
use crate::infrastructure::openai_client::OpenAiCredentials;

/// OpenAI embeddings through rig.
pub struct OpenAiEmbedding {
    credentials: OpenAiCredentials,
    model: String,
    dimension: usize,
    timeout: Duration,
}

impl OpenAiEmbedding {
    pub fn from_config(credentials: OpenAiCredentials, config: &EmbeddingConfig) -> Self {
        Self {
            credentials,
            model: config.model.clone(),
            dimension: config.dimension_for(EmbeddingProvider::OpenAi),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    fn check_dimension(&self, embedding: &Embedding) -> Result<(), DomainError> {
        if embedding.dimension() != self.dimension {
            return Err(DomainError::external(format!(
                "Model {} returned {} dimensions, expected {}",
                self.model,
                embedding.dimension(),
                self.dimension
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let mut embeddings = self.embed_batch(&[text]).await?;
        embeddings
            .pop()
            .ok_or_else(|| DomainError::external("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let client = self.credentials.client()?;
        let model = client.embedding_model(&self.model);

        let mut builder = EmbeddingsBuilder::new(model);
        for text in texts {
            builder = builder
                .document(*text)
                .map_err(|e| DomainError::external(e.to_string()))?;
        }

        let embeddings = tokio::time::timeout(self.timeout, builder.build())
            .await
            .map_err(|_| DomainError::timeout("Embedding request timed out"))?
            .map_err(|e| DomainError::external(e.to_string()))?;

        let embeddings: Vec<Embedding> = embeddings
            .into_iter()
            .map(|(_doc, emb)| {
                let vec_f32: Vec<f32> = emb.first().vec.into_iter().map(|x| x as f32).collect();
                Embedding::new(vec_f32)
            })
            .collect();

        for embedding in &embeddings {
            self.check_dimension(embedding)?;
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> OpenAiCredentials {
        OpenAiCredentials::new("sk-test").with_base_url("http://127.0.0.1:9/v1")
    }

    #[test]
    fn test_from_config() {
        let config = EmbeddingConfig {
            model: "text-embedding-3-large".to_string(),
            dimension: Some(3072),
            timeout_seconds: 5,
            ..EmbeddingConfig::default()
        };
        let embedder = OpenAiEmbedding::from_config(credentials(), &config);

        assert_eq!(embedder.model_name(), "text-embedding-3-large");
        assert_eq!(embedder.dimension(), 3072);
        assert_eq!(embedder.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_dimension_check() {
        let mut embedder = OpenAiEmbedding::from_config(credentials(), &EmbeddingConfig::default());
        embedder.dimension = 3;

        assert!(embedder.check_dimension(&Embedding::new(vec![0.0; 3])).is_ok());
        assert!(embedder.check_dimension(&Embedding::new(vec![0.0; 4])).is_err());
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let embedder = OpenAiEmbedding::from_config(credentials(), &EmbeddingConfig::default());
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let embedder = OpenAiEmbedding::from_config(credentials(), &EmbeddingConfig::default());
        let err = embedder.embed("hello").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::ExternalService(_) | DomainError::Timeout(_)
        ));
    }
}
