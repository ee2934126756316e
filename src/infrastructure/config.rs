use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";
pub const DEFAULT_PROMPTS_PATH: &str = "config/prompts.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Process-wide configuration, built once at start-up.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    /// Reads the optional YAML files, then applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let prompts_path =
            std::env::var("PROMPTS_PATH").unwrap_or_else(|_| DEFAULT_PROMPTS_PATH.into());

        let mut config: Config = read_yaml_or_default(Path::new(&config_path))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        let prompts: PromptsConfig = read_yaml_or_default(Path::new(&prompts_path))?;

        Ok(Self { config, prompts })
    }
}

fn read_yaml_or_default<T>(path: &Path) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub vector_store: VectorStoreConfig,
    pub rag: RagConfig,
    pub cors: CorsConfig,
}

impl Config {
    /// Applies environment overrides. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("SERVER_PORT") {
            self.server.port = parse_env("SERVER_PORT", v)?;
        }

        if let Some(v) = lookup("OPENAI_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = lookup("OPENAI_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.llm.base_url = Some(v);
        }
        if let Some(v) = lookup("OPENAI_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = lookup("LLM_TIMEOUT_SECONDS") {
            self.llm.timeout_seconds = parse_env("LLM_TIMEOUT_SECONDS", v)?;
        }

        if let Some(v) = lookup("EMBEDDING_PROVIDER") {
            self.embedding.provider = parse_env("EMBEDDING_PROVIDER", v)?;
        }
        if let Some(v) = lookup("EMBEDDING_MODEL") {
            self.embedding.model = v;
        }
        if let Some(v) = lookup("EMBEDDING_DIMENSION") {
            self.embedding.dimension = Some(parse_env("EMBEDDING_DIMENSION", v)?);
        }
        if let Some(v) = lookup("EMBEDDING_TIMEOUT_SECONDS") {
            self.embedding.timeout_seconds = parse_env("EMBEDDING_TIMEOUT_SECONDS", v)?;
        }

        let milvus = &mut self.vector_store.milvus;
        if let Some(v) = lookup("MILVUS_URI") {
            milvus.uri = Some(v);
        }
        if let Some(v) = lookup("MILVUS_HOST") {
            milvus.host = Some(v);
        }
        if let Some(v) = lookup("MILVUS_PORT") {
            milvus.port = parse_env("MILVUS_PORT", v)?;
        }
        if let Some(v) = lookup("MILVUS_TOKEN").filter(|v| !v.is_empty()) {
            milvus.token = Some(v);
        }
        if let Some(v) = lookup("MILVUS_COLLECTION") {
            milvus.collection = v;
        }

        match lookup("VECTOR_STORE") {
            Some(v) => self.vector_store.backend = parse_env("VECTOR_STORE", v)?,
            None if milvus.uri.is_some() || milvus.host.is_some() => {
                self.vector_store.backend = VectorStoreBackend::Milvus;
            }
            None => {}
        }
        if let Some(v) = lookup("VECTOR_STORE_PATH") {
            self.vector_store.path = PathBuf::from(v);
        }
        if let Some(v) = lookup("VECTOR_STORE_TIMEOUT_SECONDS") {
            self.vector_store.timeout_seconds = parse_env("VECTOR_STORE_TIMEOUT_SECONDS", v)?;
        }

        if let Some(v) = lookup("RAG_TOP_K") {
            self.rag.top_k = parse_env("RAG_TOP_K", v)?;
        }

        if let Some(v) = lookup("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    /// Only ever taken from `OPENAI_API_KEY`. Shared by completions and
    /// OpenAI embeddings.
    #[serde(skip)]
    pub api_key: Option<String>,
    /// OpenAI-compatible endpoint; the public API when unset.
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            base_url: None,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// OpenAI when a credential is configured, the local hashing embedder
    /// otherwise.
    #[default]
    Auto,
    OpenAi,
    Hash,
}

impl FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "openai" => Ok(Self::OpenAi),
            "hash" | "local" => Ok(Self::Hash),
            other => Err(format!("unknown embedding provider: {other}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: Option<usize>,
    pub timeout_seconds: u64,
}

pub const OPENAI_EMBEDDING_DIMENSION: usize = 1536;
pub const HASH_EMBEDDING_DIMENSION: usize = 384;

impl EmbeddingConfig {
    pub fn resolved_provider(&self, has_credential: bool) -> EmbeddingProvider {
        match self.provider {
            EmbeddingProvider::Auto if has_credential => EmbeddingProvider::OpenAi,
            EmbeddingProvider::Auto => EmbeddingProvider::Hash,
            other => other,
        }
    }

    pub fn dimension_for(&self, provider: EmbeddingProvider) -> usize {
        self.dimension.unwrap_or(match provider {
            EmbeddingProvider::Hash => HASH_EMBEDDING_DIMENSION,
            _ => OPENAI_EMBEDDING_DIMENSION,
        })
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Auto,
            model: "text-embedding-3-small".to_string(),
            dimension: None,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreBackend {
    #[default]
    File,
    Milvus,
    Memory,
    None,
}

impl VectorStoreBackend {
    /// Name reported by the store adapter and in `/vector-stats`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "json_file",
            Self::Milvus => "milvus",
            Self::Memory => "memory",
            Self::None => "none",
        }
    }
}

impl FromStr for VectorStoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(Self::File),
            "milvus" => Ok(Self::Milvus),
            "memory" => Ok(Self::Memory),
            "none" | "off" => Ok(Self::None),
            other => Err(format!("unknown vector store: {other}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub backend: VectorStoreBackend,
    pub path: PathBuf,
    pub milvus: MilvusConfig,
    pub timeout_seconds: u64,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: VectorStoreBackend::File,
            path: PathBuf::from("data/vector_store.json"),
            milvus: MilvusConfig::default(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MilvusConfig {
    pub uri: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    pub token: Option<String>,
    pub collection: String,
}

impl MilvusConfig {
    /// Base URL of the Milvus REST API. An explicit URI wins over host/port.
    pub fn endpoint(&self) -> String {
        match &self.uri {
            Some(uri) => uri.trim_end_matches('/').to_string(),
            None => format!(
                "http://{}:{}",
                self.host.as_deref().unwrap_or("localhost"),
                self.port
            ),
        }
    }
}

impl Default for MilvusConfig {
    fn default() -> Self {
        Self {
            uri: None,
            host: None,
            port: 19530,
            token: None,
            collection: "rag_documents".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub chat: ChatPrompts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatPrompts {
    pub system: String,
    /// Grounded prompt; `{context}` and `{question}` are substituted.
    pub context_template: String,
    pub fallback: String,
}

pub const DEFAULT_FALLBACK_RESPONSE: &str =
    "I'm sorry, I couldn't generate a response right now. Please try again later.";

impl Default for ChatPrompts {
    fn default() -> Self {
        Self {
            system: "You are a helpful assistant. Answer concisely. When context is provided, \
                     base your answer on it and say so if it does not contain the answer."
                .to_string(),
            context_template: "Use the following context to answer the question.\n\n\
                               Context:\n{context}\n\nQuestion: {question}"
                .to_string(),
            fallback: DEFAULT_FALLBACK_RESPONSE.to_string(),
        }
    }
}
