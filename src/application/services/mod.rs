mod chat;
mod knowledge;
mod rag;

pub use chat::ChatService;
pub use knowledge::KnowledgeService;
pub use rag::{format_context, Answer, RagService};
