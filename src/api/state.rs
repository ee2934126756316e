use std::sync::Arc;

use crate::application::{ChatService, KnowledgeService, RagService};
use crate::domain::{
    ports::{EmbeddingService, LlmService, VectorStore},
    DomainError, StoreStatus, VectorStats,
};
use crate::infrastructure::config::VectorStoreBackend;
use crate::infrastructure::{factory, AppConfig};

#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<RagService>,
    pub knowledge: Option<Arc<KnowledgeService>>,
    pub embedding: Arc<dyn EmbeddingService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        embedding: Arc<dyn EmbeddingService>,
        llm: Option<Arc<dyn LlmService>>,
        vector_store: Option<Arc<dyn VectorStore>>,
    ) -> Self {
        let config = Arc::new(config);
        let knowledge = vector_store
            .map(|store| Arc::new(KnowledgeService::new(embedding.clone(), store)));
        let chat = Arc::new(ChatService::new(llm, config.prompts.chat.clone()));
        let rag = Arc::new(RagService::new(
            knowledge.clone(),
            chat,
            config.config.rag.top_k,
        ));

        Self {
            rag,
            knowledge,
            embedding,
            config,
        }
    }

    /// Builds every adapter from configuration. An unreachable Milvus server
    /// is not fatal: the service starts without a knowledge store and reports
    /// it as not connected.
    pub async fn from_config(config: AppConfig) -> Result<Self, DomainError> {
        let embedding = factory::build_embedding(&config.config)?;
        let llm = factory::build_llm(&config.config);

        let vector_store =
            match factory::build_vector_store(&config.config, embedding.dimension()).await {
                Ok(store) => store,
                Err(e) if config.config.vector_store.backend == VectorStoreBackend::Milvus => {
                    tracing::error!(error = %e, "Milvus not available, running without a knowledge store");
                    None
                }
                Err(e) => return Err(e),
            };

        tracing::info!(
            embedding_model = embedding.model_name(),
            dimension = embedding.dimension(),
            vector_store = vector_store.as_ref().map(|s| s.backend()).unwrap_or("none"),
            completion = llm.is_some(),
            "services initialized"
        );

        Ok(Self::new(config, embedding, llm, vector_store))
    }

    pub fn configured_backend(&self) -> VectorStoreBackend {
        self.config.config.vector_store.backend
    }

    /// Stats reported when there is no live knowledge store.
    pub fn unavailable_stats(&self) -> VectorStats {
        let mut stats =
            VectorStats::not_configured(self.embedding.dimension(), self.embedding.model_name());
        if self.configured_backend() != VectorStoreBackend::None {
            stats.status = StoreStatus::NotConnected;
            stats.backend = self.configured_backend().as_str().to_string();
        }
        stats
    }
}
