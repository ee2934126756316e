mod hash;
mod openai;

pub use hash::HashEmbedding;
pub use openai::OpenAiEmbedding;
