use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, AppJson};
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: String,
    pub degraded: bool,
}

pub async fn ask(
    State(state): State<AppState>,
    AppJson(request): AppJson<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let answer = state.rag.ask(&request.message).await?;

    tracing::info!(
        sources = answer.sources.len(),
        degraded = answer.outcome.is_degraded(),
        "question answered"
    );

    Ok(Json(AskResponse {
        degraded: answer.outcome.is_degraded(),
        response: answer.outcome.into_text(),
    }))
}
