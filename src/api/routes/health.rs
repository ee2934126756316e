use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::state::AppState;
use crate::infrastructure::config::VectorStoreBackend;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub vector_store: String,
}

pub async fn hello() -> Json<Value> {
    Json(json!({ "message": "Hello, World!" }))
}

/// Liveness only; never touches the store or the completion backend.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
    })
}

pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let store_status = match &state.knowledge {
        Some(knowledge) => match knowledge.ping().await {
            Ok(()) => "connected",
            Err(e) => {
                tracing::warn!(error = %e, "readiness check failed");
                "disconnected"
            }
        },
        None if state.configured_backend() == VectorStoreBackend::None => "not_configured",
        None => "disconnected",
    };

    let is_ready = store_status != "disconnected";

    let response = ReadinessResponse {
        status: if is_ready { "ready" } else { "not_ready" }.into(),
        vector_store: store_status.into(),
    };

    let status = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
