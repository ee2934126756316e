use rag_chat::api::{create_router, AppState};
use rag_chat::infrastructure::AppConfig;
use rag_chat::telemetry;
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("rag_chat=debug,api=debug,tower_http=debug");

    let config = AppConfig::load()?;
    let addr = SocketAddr::new(config.config.server.host.parse()?, config.config.server.port);

    let state = AppState::from_config(config).await?;
    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
