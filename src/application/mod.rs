//! Application layer - Use cases and orchestration.

pub mod services;

pub use services::{Answer, ChatService, KnowledgeService, RagService};
