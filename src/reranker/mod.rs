// Reranking provider adapters
//
// Reranking is a non-essential refinement step: the orchestrator treats
// every failure here as a signal to fall back to vector-similarity order,
// never as a query failure.

pub mod cohere;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::config::RerankerConfig;
use crate::retrieval::RetrievedChunk;
use crate::types::AppResult;

#[async_trait]
pub trait Reranker: Send + Sync {
    /// Reorder `candidates` by relevance to `query`, returning at most
    /// `top_k` of them with provider-assigned scores.
    async fn rerank(
        &self,
        query: &str,
        candidates: &[RetrievedChunk],
        top_k: usize,
    ) -> AppResult<Vec<RetrievedChunk>>;
}

/// Build the configured reranker, or none. A missing API key downgrades to
/// no reranker rather than failing startup; retrieval works without one.
pub fn build_reranker(config: &RerankerConfig) -> Option<Arc<dyn Reranker>> {
    if !config.enabled {
        return None;
    }
    if config.api_key.is_empty() {
        warn!("Reranking enabled but COHERE_API_KEY is not set. Continuing without reranker.");
        return None;
    }
    Some(Arc::new(cohere::CohereReranker::new(
        &config.api_key,
        &config.model,
    )))
}
