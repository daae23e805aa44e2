// Embedding provider adapters
//
// Queries and documents embed through the same provider but with different
// task hints; batch calls either return one vector per input or fail as a
// whole, so a partially-embedded batch can never reach the stores.

pub mod nomic;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::EmbeddingConfig;
use crate::types::{AppError, AppResult};

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Dimension of every vector this provider returns.
    fn dimension(&self) -> usize;

    /// Embed a single query string.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;

    /// Embed a batch of document chunks. Must return exactly one vector per
    /// input or fail entirely.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;
}

pub fn build_embedder(config: &EmbeddingConfig) -> AppResult<Arc<dyn Embedder>> {
    match config.provider.as_str() {
        "nomic" => Ok(Arc::new(nomic::NomicEmbedder::new(
            &config.api_key,
            &config.model,
            config.dimension,
        ))),
        "openai" => Ok(Arc::new(openai::OpenAIEmbedder::new(
            &config.api_key,
            &config.model,
            config.dimension,
        ))),
        other => Err(AppError::EmbeddingUnavailable(format!(
            "Unsupported embedding provider: {}",
            other
        ))),
    }
}
