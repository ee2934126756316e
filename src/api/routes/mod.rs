pub mod chat;
pub mod documents;
pub mod health;
pub mod pages;

use axum::http::{header, Method};
use axum::middleware;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::middleware::request_logger;
use crate::api::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.config.cors.allowed_origins);

    Router::new()
        .route("/", get(pages::index))
        .route("/hello", get(health::hello))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/ask", post(chat::ask))
        .route("/add-document", post(documents::add_document))
        .route("/search", post(documents::search_documents))
        .route("/documents", delete(documents::clear_documents))
        .route("/vector-stats", get(documents::vector_stats))
        .layer(middleware::from_fn(request_logger))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}
