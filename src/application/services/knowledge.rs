use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingService, VectorStore},
    Document, DomainError, Embedding, SearchResult, VectorStats,
};

/// Knowledge-store client: embeds text and delegates storage and similarity
/// search to the configured [`VectorStore`].
pub struct KnowledgeService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
}

impl KnowledgeService {
    pub fn new(embedding: Arc<dyn EmbeddingService>, vector_store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedding,
            vector_store,
        }
    }

    pub fn backend(&self) -> &'static str {
        self.vector_store.backend()
    }


    #[instrument(skip(self, content, metadata), fields(backend = self.backend()))]
    pub async fn add(&self, content: &str, metadata: &str) -> Result<Document, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::validation("content must not be empty"));
        }

        let embedding = self.embed(content).await?;

        let document = Document::new(content, metadata);
        let id = self
            .vector_store
            .insert(&document, &embedding)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to store document"))?;

        tracing::info!(document_id = %id, dimension = embedding.dimension(), "document added");
        Ok(document.with_id(id))
    }

    #[instrument(skip(self, query), fields(backend = self.backend()))]
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::validation("query must not be empty"));
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.embed(query).await?;
        self.vector_store.search(&embedding, top_k).await
    }

    pub async fn stats(&self) -> Result<VectorStats, DomainError> {
        Ok(self
            .vector_store
            .stats()
            .await?
            .with_embedding_model(self.embedding.model_name()))
    }

    #[instrument(skip(self), fields(backend = self.backend()))]
    pub async fn clear(&self) -> Result<(), DomainError> {
        self.vector_store.clear().await?;
        tracing::info!("knowledge store cleared");
        Ok(())
    }

    /// Embedding failures make the store unusable for this call and are
    /// reported as such.
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.embedding.embed(text).await.map_err(|e| {
            tracing::error!(error = %e, model = self.embedding.model_name(), "embedding failed");
            DomainError::store_unavailable(format!("Embedding backend failed: {e}"))
        })
    }

    pub async fn ping(&self) -> Result<(), DomainError> {
        self.vector_store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{HashEmbedding, InMemoryVectorStore};
    use async_trait::async_trait;

    fn service() -> KnowledgeService {
        KnowledgeService::new(
            Arc::new(HashEmbedding::new(384)),
            Arc::new(InMemoryVectorStore::new(384)),
        )
    }

    struct FailingEmbedding;

    #[async_trait]
    impl EmbeddingService for FailingEmbedding {
        async fn embed(&self, _text: &str) -> Result<Embedding, DomainError> {
            Err(DomainError::external("connection refused"))
        }

        async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            Err(DomainError::external("connection refused"))
        }

        fn dimension(&self) -> usize {
            384
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_add_then_search_finds_document_first() {
        let service = service();
        service
            .add("Docker is a platform for containers", "{}")
            .await
            .unwrap();
        let doc = service
            .add("FastAPI is a web framework", r#"{"topic":"fastapi"}"#)
            .await
            .unwrap();

        let results = service.search("FastAPI is a web framework", 3).await.unwrap();

        assert_eq!(results[0].document.id, doc.id);
        assert!((results[0].score - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_count_grows_by_one_per_add() {
        let service = service();
        for i in 0..3 {
            service.add(&format!("document number {i}"), "{}").await.unwrap();
            assert_eq!(service.stats().await.unwrap().count, i + 1);
        }
    }

    #[tokio::test]
    async fn test_empty_content_rejected_without_side_effects() {
        let service = service();
        let err = service.add("   ", "{}").await.unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(service.stats().await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_search_empty_store_is_empty() {
        let results = service().search("anything", 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_is_store_unavailable() {
        let service = KnowledgeService::new(
            Arc::new(FailingEmbedding),
            Arc::new(InMemoryVectorStore::new(384)),
        );
        let err = service.add("content", "{}").await.unwrap_err();

        assert!(matches!(err, DomainError::StoreUnavailable(_)));
        assert_eq!(service.stats().await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_search_embedding_failure_is_store_unavailable() {
        let service = KnowledgeService::new(
            Arc::new(FailingEmbedding),
            Arc::new(InMemoryVectorStore::new(384)),
        );
        let err = service.search("anything", 3).await.unwrap_err();

        assert!(matches!(err, DomainError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_stats_report_embedding_model() {
        let stats = service().stats().await.unwrap();
        assert_eq!(stats.embedding_model, HashEmbedding::MODEL_NAME);
        assert_eq!(stats.dimension, 384);
        assert_eq!(stats.backend, "memory");
    }
}
