use std::sync::Arc;
use tracing::instrument;

use crate::application::services::{ChatService, KnowledgeService};
use crate::domain::{ChatOutcome, DomainError, SearchResult};

/// Answer to a question together with the passages it was grounded on.
#[derive(Debug, Clone)]
pub struct Answer {
    pub outcome: ChatOutcome,
    pub sources: Vec<SearchResult>,
}

/// Retrieval-augmented question answering: top-k retrieval from the
/// knowledge store (when one is configured), then a completion.
pub struct RagService {
    knowledge: Option<Arc<KnowledgeService>>,
    chat: Arc<ChatService>,
    top_k: usize,
}

impl RagService {
    pub fn new(
        knowledge: Option<Arc<KnowledgeService>>,
        chat: Arc<ChatService>,
        top_k: usize,
    ) -> Self {
        Self {
            knowledge,
            chat,
            top_k,
        }
    }

    #[instrument(skip(self, message), fields(top_k = self.top_k))]
    pub async fn ask(&self, message: &str) -> Result<Answer, DomainError> {
        if message.trim().is_empty() {
            return Err(DomainError::validation("message must not be empty"));
        }

        let sources = self.retrieve(message).await;
        let context = format_context(&sources);
        let outcome = self.chat.complete(message, context.as_deref()).await?;

        Ok(Answer { outcome, sources })
    }

    /// Retrieval failures never fail the question; the answer is generated
    /// without context instead.
    async fn retrieve(&self, message: &str) -> Vec<SearchResult> {
        let Some(knowledge) = &self.knowledge else {
            return Vec::new();
        };

        match knowledge.search(message, self.top_k).await {
            Ok(results) => {
                tracing::debug!(count = results.len(), "retrieved context");
                results
            }
            Err(e) => {
                tracing::warn!(error = %e, "retrieval failed, answering without context");
                Vec::new()
            }
        }
    }
}

/// Numbered passages, one per retrieved document.
pub fn format_context(results: &[SearchResult]) -> Option<String> {
    if results.is_empty() {
        return None;
    }

    Some(
        results
            .iter()
            .enumerate()
            .map(|(i, r)| format!("[{}] {}", i + 1, r.document.content))
            .collect::<Vec<_>>()
            .join("\n\n"),
    )
}
