mod chat;
mod document;
mod embedding;

pub use chat::ChatOutcome;
pub use document::{Document, SearchResult, StoreStatus, VectorStats};
pub use embedding::Embedding;
