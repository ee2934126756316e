use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{check_dimension, rank, StoredRecord};
use crate::infrastructure::config::VectorStoreBackend;
use crate::domain::{
    ports::VectorStore, Document, DomainError, Embedding, SearchResult, VectorStats,
};

pub struct InMemoryVectorStore {
    records: RwLock<Vec<StoredRecord>>,
    dimension: usize,
}

impl InMemoryVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            dimension,
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn insert(
        &self,
        document: &Document,
        embedding: &Embedding,
    ) -> Result<String, DomainError> {
        check_dimension(embedding, self.dimension)?;

        let mut records = self.records.write().await;
        records.push(StoredRecord {
            document: document.clone(),
            embedding: embedding.clone(),
        });
        Ok(document.id.clone())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        check_dimension(query, self.dimension)?;
        let records = self.records.read().await;
        Ok(rank(&records, query, top_k))
    }

    async fn stats(&self) -> Result<VectorStats, DomainError> {
        let count = self.records.read().await.len();
        Ok(VectorStats::new(self.backend(), count, self.dimension))
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.records.write().await.clear();
        Ok(())
    }

    fn backend(&self) -> &'static str {
        VectorStoreBackend::Memory.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_search() {
        let store = InMemoryVectorStore::new(3);
        let doc = Document::new("test content", "{}");

        let id = store
            .insert(&doc, &Embedding::new(vec![1.0, 0.0, 0.0]))
            .await
            .unwrap();
        assert_eq!(id, doc.id);

        let results = store
            .search(&Embedding::new(vec![1.0, 0.0, 0.0]), 1)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_search_empty_store() {
        let store = InMemoryVectorStore::new(3);
        let results = store
            .search(&Embedding::new(vec![1.0, 0.0, 0.0]), 5)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let store = InMemoryVectorStore::new(3);
        let err = store
            .insert(&Document::new("x", "{}"), &Embedding::new(vec![1.0, 0.0]))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(store.stats().await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryVectorStore::new(2);
        store
            .insert(&Document::new("x", "{}"), &Embedding::new(vec![1.0, 0.0]))
            .await
            .unwrap();
        store.clear().await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.dimension, 2);
        assert_eq!(stats.backend, "memory");
    }
}
