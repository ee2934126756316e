use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// One line per request; level follows the response class so degraded
/// traffic stands out in the default filter.
pub async fn request_logger(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match status {
        500.. => tracing::error!(%method, %path, status, elapsed_ms, "request failed"),
        400..=499 => tracing::warn!(%method, %path, status, elapsed_ms, "request rejected"),
        _ => tracing::info!(%method, %path, status, elapsed_ms, "request completed"),
    }

    response
}
