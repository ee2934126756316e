use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored piece of knowledge. The metadata is kept as the caller sent it;
/// it is only interpreted as JSON when presented back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(content: impl Into<String>, metadata: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            metadata: metadata.into(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Metadata parsed as JSON, or an empty object when it is not valid JSON.
    pub fn metadata_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.metadata).unwrap_or_else(|_| serde_json::json!({}))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub document: Document,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    Connected,
    NotConnected,
    NotConfigured,
}

/// Read-only summary of a knowledge store, computed on demand.
#[derive(Debug, Clone, Serialize)]
pub struct VectorStats {
    pub count: usize,
    pub dimension: usize,
    pub backend: String,
    pub status: StoreStatus,
    pub embedding_model: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl VectorStats {
    pub fn new(backend: impl Into<String>, count: usize, dimension: usize) -> Self {
        Self {
            count,
            dimension,
            backend: backend.into(),
            status: StoreStatus::Connected,
            embedding_model: String::new(),
            details: serde_json::Map::new(),
        }
    }

    pub fn not_configured(dimension: usize, embedding_model: impl Into<String>) -> Self {
        Self {
            status: StoreStatus::NotConfigured,
            embedding_model: embedding_model.into(),
            ..Self::new("none", 0, dimension)
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_json_parses_object() {
        let doc = Document::new("content", r#"{"topic": "rag"}"#);
        assert_eq!(doc.metadata_json()["topic"], "rag");
    }

    #[test]
    fn test_metadata_json_falls_back_to_empty_object() {
        let doc = Document::new("content", "not json");
        assert_eq!(doc.metadata_json(), serde_json::json!({}));
    }

    #[test]
    fn test_stats_details_are_flattened() {
        let stats = VectorStats::new("json_file", 2, 384)
            .with_embedding_model("hash")
            .with_detail("path", "data/vector_store.json");
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["count"], 2);
        assert_eq!(json["dimension"], 384);
        assert_eq!(json["status"], "connected");
        assert_eq!(json["path"], "data/vector_store.json");
    }

    #[test]
    fn test_not_configured_stats() {
        let stats = VectorStats::not_configured(1536, "text-embedding-3-small");
        assert_eq!(stats.count, 0);
        assert_eq!(stats.status, StoreStatus::NotConfigured);
    }
}
