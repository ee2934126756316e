use std::sync::Arc;
use std::time::Duration;

use crate::domain::{
    ports::{EmbeddingService, LlmService, VectorStore},
    DomainError,
};
use crate::infrastructure::config::{Config, EmbeddingProvider, VectorStoreBackend};
use crate::infrastructure::{
    HashEmbedding, InMemoryVectorStore, JsonFileVectorStore, MilvusVectorStore, OpenAiCredentials,
    OpenAiEmbedding, OpenAiLlm,
};

/// Fails when OpenAI embeddings are requested explicitly without a key.
pub fn build_embedding(config: &Config) -> Result<Arc<dyn EmbeddingService>, DomainError> {
    let credentials = OpenAiCredentials::from_config(&config.llm);
    let provider = config.embedding.resolved_provider(credentials.is_some());

    match (provider, credentials) {
        (EmbeddingProvider::OpenAi, Some(credentials)) => Ok(Arc::new(
            OpenAiEmbedding::from_config(credentials, &config.embedding),
        )),
        (EmbeddingProvider::OpenAi, None) => Err(DomainError::validation(
            "EMBEDDING_PROVIDER=openai requires OPENAI_API_KEY",
        )),
        _ => Ok(Arc::new(HashEmbedding::new(
            config.embedding.dimension_for(EmbeddingProvider::Hash),
        ))),
    }
}

/// `None` when no credential is configured; chat then always degrades.
pub fn build_llm(config: &Config) -> Option<Arc<dyn LlmService>> {
    let llm = OpenAiLlm::from_config(&config.llm)?;
    Some(Arc::new(llm))
}

pub async fn build_vector_store(
    config: &Config,
    dimension: usize,
) -> Result<Option<Arc<dyn VectorStore>>, DomainError> {
    let store_config = &config.vector_store;

    let store: Arc<dyn VectorStore> = match store_config.backend {
        VectorStoreBackend::None => return Ok(None),
        VectorStoreBackend::Memory => Arc::new(InMemoryVectorStore::new(dimension)),
        VectorStoreBackend::File => {
            Arc::new(JsonFileVectorStore::open(&store_config.path, dimension).await?)
        }
        VectorStoreBackend::Milvus => Arc::new(
            MilvusVectorStore::connect(
                &store_config.milvus,
                dimension,
                Duration::from_secs(store_config.timeout_seconds),
            )
            .await?,
        ),
    };

    Ok(Some(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_credential_means_hash_embedding_and_no_llm() {
        let config = Config::default();
        let embedding = build_embedding(&config).unwrap();

        assert_eq!(embedding.model_name(), HashEmbedding::MODEL_NAME);
        assert_eq!(embedding.dimension(), 384);
        assert!(build_llm(&config).is_none());
    }

    #[test]
    fn test_credential_selects_openai() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-test".to_string());

        assert_eq!(build_embedding(&config).unwrap().dimension(), 1536);
        assert_eq!(build_llm(&config).unwrap().model_name(), "gpt-4o-mini");
    }

    #[test]
    fn test_openai_embeddings_without_key_rejected_at_startup() {
        let mut config = Config::default();
        config.embedding.provider = EmbeddingProvider::OpenAi;

        let err = build_embedding(&config).err().unwrap();
        assert!(matches!(err, DomainError::Validation(ref m) if m.contains("OPENAI_API_KEY")));
    }

    #[test]
    fn test_hash_provider_ignores_credential() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-test".to_string());
        config.embedding.provider = EmbeddingProvider::Hash;

        let embedding = build_embedding(&config).unwrap();
        assert_eq!(embedding.model_name(), HashEmbedding::MODEL_NAME);
    }

    #[tokio::test]
    async fn test_backend_selection() {
        let mut config = Config::default();

        config.vector_store.backend = VectorStoreBackend::None;
        assert!(build_vector_store(&config, 8).await.unwrap().is_none());

        config.vector_store.backend = VectorStoreBackend::Memory;
        let store = build_vector_store(&config, 8).await.unwrap().unwrap();
        assert_eq!(store.backend(), VectorStoreBackend::Memory.as_str());

        let dir = tempfile::TempDir::new().unwrap();
        config.vector_store.backend = VectorStoreBackend::File;
        config.vector_store.path = dir.path().join("store.json");
        let store = build_vector_store(&config, 8).await.unwrap().unwrap();
        assert_eq!(store.backend(), VectorStoreBackend::File.as_str());
    }
}
