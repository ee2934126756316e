use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};

/// Offline embedder using signed feature hashing over lower-cased word
/// tokens and adjacent word pairs. Deterministic across processes, so
/// vectors persisted by one run stay comparable in the next.
pub struct HashEmbedding {
    dimension: usize,
}

impl HashEmbedding {
    pub const MODEL_NAME: &'static str = "feature-hash";

    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    fn bucket(&self, feature: &str) -> (usize, f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut index = [0u8; 8];
        index.copy_from_slice(&digest[..8]);
        let index = (u64::from_le_bytes(index) % self.dimension as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }

    fn vectorize(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimension];
        let tokens = Self::tokens(text);

        for token in &tokens {
            let (index, sign) = self.bucket(token);
            vector[index] += sign;
        }
        for pair in tokens.windows(2) {
            let (index, sign) = self.bucket(&format!("{} {}", pair[0], pair[1]));
            vector[index] += 0.5 * sign;
        }

        Embedding::new(vector).normalized()
    }
}

#[async_trait]
impl EmbeddingService for HashEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        Self::MODEL_NAME
    }
}
