use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::error::{ApiError, AppJson};
use crate::api::state::AppState;
use crate::application::KnowledgeService;
use crate::domain::{DomainError, SearchResult, VectorStats};

const MAX_SEARCH_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct AddDocumentRequest {
    pub content: String,
    /// Either a string (kept verbatim) or any JSON value (stored serialized).
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl AddDocumentRequest {
    fn metadata_string(&self) -> String {
        match &self.metadata {
            None | Some(Value::Null) => "{}".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddDocumentResponse {
    pub status: String,
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchDocumentsRequest {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResultResponse {
    pub id: String,
    pub content: String,
    pub metadata: Value,
    pub score: f32,
}

impl From<SearchResult> for SearchResultResponse {
    fn from(result: SearchResult) -> Self {
        Self {
            metadata: result.document.metadata_json(),
            id: result.document.id,
            content: result.document.content,
            score: result.score,
        }
    }
}

fn require_store(state: &AppState) -> Result<&Arc<KnowledgeService>, ApiError> {
    state
        .knowledge
        .as_ref()
        .ok_or_else(|| DomainError::store_unavailable("no knowledge store configured").into())
}

pub async fn add_document(
    State(state): State<AppState>,
    AppJson(request): AppJson<AddDocumentRequest>,
) -> Result<Json<AddDocumentResponse>, ApiError> {
    let knowledge = require_store(&state)?;
    let document = knowledge
        .add(&request.content, &request.metadata_string())
        .await?;

    Ok(Json(AddDocumentResponse {
        status: "success".to_string(),
        id: document.id,
    }))
}

pub async fn search_documents(
    State(state): State<AppState>,
    AppJson(request): AppJson<SearchDocumentsRequest>,
) -> Result<Json<Vec<SearchResultResponse>>, ApiError> {
    let knowledge = require_store(&state)?;
    let top_k = request
        .limit
        .unwrap_or(state.config.config.rag.top_k)
        .min(MAX_SEARCH_LIMIT);

    let results = knowledge.search(&request.query, top_k).await?;
    Ok(Json(results.into_iter().map(Into::into).collect()))
}

pub async fn clear_documents(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    require_store(&state)?.clear().await?;
    Ok(Json(json!({ "status": "cleared" })))
}

pub async fn vector_stats(State(state): State<AppState>) -> Result<Json<VectorStats>, ApiError> {
    match &state.knowledge {
        Some(knowledge) => Ok(Json(knowledge.stats().await?)),
        None => Ok(Json(state.unavailable_stats())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(metadata: Option<Value>) -> AddDocumentRequest {
        AddDocumentRequest {
            content: "c".to_string(),
            metadata,
        }
    }

    #[test]
    fn test_metadata_string_variants() {
        assert_eq!(request(None).metadata_string(), "{}");
        assert_eq!(request(Some(Value::Null)).metadata_string(), "{}");
        assert_eq!(
            request(Some(json!(r#"{"a":1}"#))).metadata_string(),
            r#"{"a":1}"#
        );
        assert_eq!(request(Some(json!({"a": 1}))).metadata_string(), r#"{"a":1}"#);
    }
}
