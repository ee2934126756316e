use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::{check_dimension, rank, StoredRecord};
use crate::infrastructure::config::VectorStoreBackend;
use crate::domain::{
    ports::VectorStore, Document, DomainError, Embedding, SearchResult, VectorStats,
};

/// Vector store kept in memory and mirrored to a JSON array on disk after
/// every write. Writers hold the lock across the file write, and the file is
/// replaced atomically through a sibling `.tmp` file.
pub struct JsonFileVectorStore {
    path: PathBuf,
    dimension: usize,
    records: RwLock<Vec<StoredRecord>>,
}

impl JsonFileVectorStore {
    /// Loads `path` if it exists. A missing or empty file is an empty store.
    pub async fn open(path: impl Into<PathBuf>, dimension: usize) -> Result<Self, DomainError> {
        let path = path.into();
        let records = load_records(&path).await?;

        if let Some(record) = records
            .iter()
            .find(|r| r.embedding.dimension() != dimension)
        {
            return Err(DomainError::validation(format!(
                "{} holds {}-dimensional embeddings (document {}), embedder produces {}",
                path.display(),
                record.embedding.dimension(),
                record.document.id,
                dimension
            )));
        }

        tracing::info!(path = %path.display(), count = records.len(), dimension, "vector store loaded");

        Ok(Self {
            path,
            dimension,
            records: RwLock::new(records),
        })
    }

    async fn persist(&self, records: &[StoredRecord]) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error("create directory for", e))?;
        }

        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| DomainError::internal(format!("Failed to serialize store: {e}")))?;

        let tmp = tmp_path(&self.path);
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.io_error("write", e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error("replace", e))
    }

    fn io_error(&self, action: &str, err: std::io::Error) -> DomainError {
        DomainError::store_unavailable(format!(
            "Failed to {action} {}: {err}",
            self.path.display()
        ))
    }
}

async fn load_records(path: &Path) -> Result<Vec<StoredRecord>, DomainError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(DomainError::store_unavailable(format!(
                "Failed to read {}: {e}",
                path.display()
            )))
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    serde_json::from_slice(&bytes).map_err(|e| {
        DomainError::store_unavailable(format!("Corrupt store file {}: {e}", path.display()))
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[async_trait]
impl VectorStore for JsonFileVectorStore {
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

        if let Err(e) = self.persist(&records).await {
            records.pop();
            return Err(e);
        }

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
        Ok(VectorStats::new(self.backend(), count, self.dimension)
            .with_detail("path", self.path.display().to_string()))
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        let previous = std::mem::take(&mut *records);

        if let Err(e) = self.persist(&records).await {
            *records = previous;
            return Err(e);
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        VectorStoreBackend::File.as_str()
    }
}
