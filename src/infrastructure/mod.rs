pub mod config;
pub mod embedding;
pub mod factory;
pub mod llm;
pub mod openai_client;
pub mod samples;
pub mod vector_store;

pub use config::{AppConfig, Config, PromptsConfig};
pub use embedding::{HashEmbedding, OpenAiEmbedding};
pub use llm::OpenAiLlm;
pub use openai_client::OpenAiCredentials;
pub use vector_store::{InMemoryVectorStore, JsonFileVectorStore, MilvusVectorStore};
