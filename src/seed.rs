use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

use rag_chat::application::KnowledgeService;
use rag_chat::domain::{ports::VectorStore, DomainError};
use rag_chat::infrastructure::config::{Config, VectorStoreBackend};
use rag_chat::infrastructure::samples::SAMPLE_DOCUMENTS;
use rag_chat::infrastructure::{factory, AppConfig, MilvusVectorStore};
use rag_chat::telemetry;

/// Loads the bundled sample documents into the configured knowledge store.
#[derive(Debug, Parser)]
#[command(name = "seed", version)]
struct Args {
    /// Only verify that the configured store is reachable.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("rag_chat=info,seed=info");
    let args = Args::parse();

    let config = AppConfig::load()?;
    let embedding = factory::build_embedding(&config.config)?;

    if args.check {
        return Ok(match check_store(&config.config, embedding.dimension()).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(
                    backend = config.config.vector_store.backend.as_str(),
                    error = %e,
                    "vector store check failed"
                );
                ExitCode::FAILURE
            }
        });
    }

    let Some(store) = factory::build_vector_store(&config.config, embedding.dimension()).await?
    else {
        error!("no vector store configured (VECTOR_STORE=none)");
        return Ok(ExitCode::FAILURE);
    };
    let knowledge = KnowledgeService::new(embedding, store);

    let mut added = 0usize;
    for sample in SAMPLE_DOCUMENTS {
        match knowledge.add(sample.content, sample.metadata).await {
            Ok(doc) => {
                added += 1;
                info!(document_id = %doc.id, "sample document added");
            }
            Err(e) => error!(error = %e, "failed to add sample document"),
        }
    }

    let stats = knowledge.stats().await?;
    info!(
        added,
        total = stats.count,
        dimension = stats.dimension,
        backend = %stats.backend,
        "seeding finished"
    );
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(if added == SAMPLE_DOCUMENTS.len() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Read-only reachability check. Milvus is asked for its collection list and
/// nothing is created; local stores are opened and pinged.
async fn check_store(config: &Config, dimension: usize) -> Result<(), DomainError> {
    let store_config = &config.vector_store;

    if store_config.backend == VectorStoreBackend::Milvus {
        let milvus = MilvusVectorStore::new(
            &store_config.milvus,
            dimension,
            Duration::from_secs(store_config.timeout_seconds),
        )?;
        let collections = milvus.list_collections().await?;
        info!(
            endpoint = %store_config.milvus.endpoint(),
            collections = ?collections,
            collection_exists = collections.contains(&store_config.milvus.collection),
            "Milvus reachable"
        );
        return Ok(());
    }

    let store = factory::build_vector_store(config, dimension)
        .await?
        .ok_or_else(|| DomainError::validation("no vector store configured (VECTOR_STORE=none)"))?;
    store.ping().await?;
    info!(backend = store.backend(), "vector store reachable");
    Ok(())
}
