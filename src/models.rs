// Shared application state and HTTP request/response models

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::retrieval::{RetrievalService, RetrievedChunk};
use crate::vector_index::SimilarityMetric;

#[derive(Clone)]
pub struct AppState {
    pub retrieval: Arc<RetrievalService>,
    pub pool: SqlitePool,
    pub config: Config,
}

#[derive(Debug, serde::Deserialize)]
pub struct IngestRequest {
    pub texts: Vec<String>,
    pub metadata: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, serde::Deserialize)]
pub struct IngestTextRequest {
    pub source: String,
    pub text: String,
}

#[derive(Debug, serde::Serialize)]
pub struct IngestResponse {
    pub added_chunks: usize,
    pub total_vectors: usize,
}

#[derive(Debug, serde::Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: Option<usize>,
    pub threshold: Option<f32>,
}

#[derive(Debug, serde::Serialize)]
pub struct SearchResponse {
    pub results: Vec<RetrievedChunk>,
    pub count: usize,
}

#[derive(Debug, serde::Serialize)]
pub struct QueryResponse {
    pub results: Vec<RetrievedChunk>,
    pub context: String,
    /// True when the documented second attempt (threshold 0, doubled top_k)
    /// produced these results.
    pub widened: bool,
}

#[derive(Debug, serde::Deserialize)]
pub struct MigrateRequest {
    pub metric: SimilarityMetric,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub database: String,
}
