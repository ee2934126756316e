use std::sync::Arc;
use tracing::instrument;

use crate::domain::{ports::LlmService, ChatOutcome, DomainError};
use crate::infrastructure::config::ChatPrompts;

/// Chat-completion client. Makes a single attempt per message; any failure
/// is answered with the configured fallback text as [`ChatOutcome::Degraded`].
pub struct ChatService {
    llm: Option<Arc<dyn LlmService>>,
    prompts: ChatPrompts,
}

impl ChatService {
    /// `llm` is `None` when no completion credential is configured.
    pub fn new(llm: Option<Arc<dyn LlmService>>, prompts: ChatPrompts) -> Self {
        Self { llm, prompts }
    }

    pub fn build_prompt(&self, message: &str, context: Option<&str>) -> String {
        match context.filter(|c| !c.trim().is_empty()) {
            Some(context) => render_template(&self.prompts.context_template, context, message),
            None => message.to_string(),
        }
    }

    fn degraded(&self, reason: impl Into<String>) -> ChatOutcome {
        ChatOutcome::Degraded {
            text: self.prompts.fallback.clone(),
            reason: reason.into(),
        }
    }

    #[instrument(skip(self, message, context), fields(has_context = context.is_some()))]
    pub async fn complete(
        &self,
        message: &str,
        context: Option<&str>,
    ) -> Result<ChatOutcome, DomainError> {
        if message.trim().is_empty() {
            return Err(DomainError::validation("message must not be empty"));
        }

        let Some(llm) = &self.llm else {
            tracing::warn!("no completion credential configured, returning fallback");
            return Ok(self.degraded("no completion credential configured"));
        };

        let prompt = self.build_prompt(message, context);
        match llm.complete(&self.prompts.system, &prompt).await {
            Ok(text) if text.trim().is_empty() => {
                tracing::warn!(model = llm.model_name(), "empty completion, returning fallback");
                Ok(self.degraded("empty completion"))
            }
            Ok(text) => Ok(ChatOutcome::Answered(text)),
            Err(e) => {
                tracing::warn!(model = llm.model_name(), error = %e, "completion failed, returning fallback");
                Ok(self.degraded(e.to_string()))
            }
        }
    }
}

/// Substitutes `{context}` and `{question}` in one pass over the template,
/// so placeholder text inside the substituted values is left as is.
fn render_template(template: &str, context: &str, question: &str) -> String {
    let mut out = String::with_capacity(template.len() + context.len() + question.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{context}") {
            out.push_str(context);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{question}") {
            out.push_str(question);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}
