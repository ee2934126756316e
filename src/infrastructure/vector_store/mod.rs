mod in_memory;
mod json_file;
mod milvus;

pub use in_memory::InMemoryVectorStore;
pub use json_file::JsonFileVectorStore;
pub use milvus::MilvusVectorStore;

use serde::{Deserialize, Serialize};

use crate::domain::{Document, DomainError, Embedding, SearchResult};

/// One persisted row: a document together with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredRecord {
    #[serde(flatten)]
    pub document: Document,
    pub embedding: Embedding,
}

pub(crate) fn check_dimension(embedding: &Embedding, expected: usize) -> Result<(), DomainError> {
    if embedding.dimension() != expected {
        return Err(DomainError::validation(format!(
            "Embedding has {} dimensions, store expects {}",
            embedding.dimension(),
            expected
        )));
    }
    Ok(())
}

/// Linear cosine scan. The sort is stable, so equal scores keep insertion
/// order.
pub(crate) fn rank(records: &[StoredRecord], query: &Embedding, top_k: usize) -> Vec<SearchResult> {
    if top_k == 0 {
        return Vec::new();
    }

    let mut results: Vec<SearchResult> = records
        .iter()
        .map(|record| SearchResult {
            document: record.document.clone(),
            score: query.cosine_similarity(&record.embedding),
        })
        .collect();

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(top_k);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str, vector: Vec<f32>) -> StoredRecord {
        StoredRecord {
            document: Document::new(content, "{}"),
            embedding: Embedding::new(vector),
        }
    }

    #[test]
    fn test_rank_orders_by_score() {
        let records = vec![
            record("far", vec![0.0, 1.0]),
            record("near", vec![1.0, 0.1]),
            record("exact", vec![1.0, 0.0]),
        ];
        let results = rank(&records, &Embedding::new(vec![1.0, 0.0]), 3);

        let contents: Vec<_> = results.iter().map(|r| r.document.content.as_str()).collect();
        assert_eq!(contents, vec!["exact", "near", "far"]);
    }

    #[test]
    fn test_rank_ties_keep_insertion_order() {
        let records = vec![
            record("first", vec![1.0, 0.0]),
            record("second", vec![2.0, 0.0]),
            record("third", vec![3.0, 0.0]),
        ];
        let results = rank(&records, &Embedding::new(vec![1.0, 0.0]), 2);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.content, "first");
        assert_eq!(results[1].document.content, "second");
    }

    #[test]
    fn test_rank_empty_and_zero_k() {
        let query = Embedding::new(vec![1.0, 0.0]);
        assert!(rank(&[], &query, 3).is_empty());
        assert!(rank(&[record("a", vec![1.0, 0.0])], &query, 0).is_empty());
    }

    #[test]
    fn test_stored_record_json_shape() {
        let json = serde_json::to_value(record("hello", vec![0.5, 0.5])).unwrap();
        assert_eq!(json["content"], "hello");
        assert_eq!(json["metadata"], "{}");
        assert_eq!(json["embedding"], serde_json::json!([0.5, 0.5]));
        assert!(json["id"].is_string());
    }
}
