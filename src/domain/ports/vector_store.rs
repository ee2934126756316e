use crate::domain::{errors::DomainError, Document, Embedding, SearchResult, VectorStats};
use async_trait::async_trait;

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Stores the document with its embedding and returns the identifier the
    /// backend assigned to it.
    async fn insert(&self, document: &Document, embedding: &Embedding)
        -> Result<String, DomainError>;

    /// Top `top_k` documents by descending cosine similarity.
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError>;

    async fn stats(&self) -> Result<VectorStats, DomainError>;

    async fn clear(&self) -> Result<(), DomainError>;

    async fn ping(&self) -> Result<(), DomainError> {
        self.stats().await.map(|_| ())
    }

    fn backend(&self) -> &'static str;
}
