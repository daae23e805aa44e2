// Shared fixtures for service-level tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::config::{
    Config, DatabaseConfig, EmbeddingConfig, RerankerConfig, RetrievalConfig, ServerConfig,
    VectorStoreConfig,
};
use crate::embeddings::Embedder;
use crate::reranker::Reranker;
use crate::retrieval::{RetrievalService, RetrievedChunk};
use crate::types::{AppError, AppResult};
use crate::vector_index::SimilarityMetric;

pub(crate) const TEST_DIMENSION: usize = 3;

/// Embedder with a fixed word -> vector table, so tests control geometry
/// exactly: "apple" and "apricot" are near-parallel, the rest orthogonal.
pub(crate) struct StubEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl Default for StubEmbedder {
    fn default() -> Self {
        let mut vectors = HashMap::new();
        vectors.insert("apple".to_string(), vec![1.0, 0.0, 0.0]);
        vectors.insert("apricot".to_string(), vec![0.95, 0.05, 0.0]);
        vectors.insert("banana".to_string(), vec![0.0, 1.0, 0.0]);
        vectors.insert("cherry".to_string(), vec![0.0, 0.0, 1.0]);
        vectors.insert("date".to_string(), vec![0.5, 0.5, 0.0]);
        vectors.insert("elderberry".to_string(), vec![0.0, 0.5, 0.5]);
        Self { vectors }
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    fn dimension(&self) -> usize {
        TEST_DIMENSION
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| AppError::EmbeddingUnavailable(format!("no stub vector for {:?}", text)))
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}

pub(crate) struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn dimension(&self) -> usize {
        TEST_DIMENSION
    }

    async fn embed(&self, _text: &str) -> AppResult<Vec<f32>> {
        Err(AppError::EmbeddingUnavailable("provider is down".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Err(AppError::EmbeddingUnavailable("provider is down".to_string()))
    }
}

/// Reverses candidate order and assigns fresh descending scores.
pub(crate) struct StubReranker;

#[async_trait]
impl Reranker for StubReranker {
    async fn rerank(
        &self,
        _query: &str,
        candidates: &[RetrievedChunk],
        top_k: usize,
    ) -> AppResult<Vec<RetrievedChunk>> {
        Ok(candidates
            .iter()
            .rev()
            .take(top_k)
            .enumerate()
            .map(|(i, c)| RetrievedChunk {
                score: 0.99 - i as f32 * 0.01,
                ..c.clone()
            })
            .collect())
    }
}

pub(crate) struct FailingReranker;

#[async_trait]
impl Reranker for FailingReranker {
    async fn rerank(
        &self,
        _query: &str,
        _candidates: &[RetrievedChunk],
        _top_k: usize,
    ) -> AppResult<Vec<RetrievedChunk>> {
        Err(AppError::Internal("reranker exploded".to_string()))
    }
}

pub(crate) fn test_config(dir: &tempfile::TempDir) -> Config {
    Config {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        embedding: EmbeddingConfig {
            provider: "nomic".to_string(),
            model: "stub".to_string(),
            dimension: TEST_DIMENSION,
            api_key: String::new(),
        },
        reranker: RerankerConfig {
            enabled: false,
            model: "rerank-v3.5".to_string(),
            api_key: String::new(),
        },
        retrieval: RetrievalConfig {
            top_k: 5,
            similarity_threshold: 0.5,
            chunk_size: 600,
            chunk_overlap: 100,
        },
        vector_store: VectorStoreConfig {
            dir: dir.path().join("vector_store").display().to_string(),
            index_name: "vectors.idx".to_string(),
            metric: SimilarityMetric::InnerProduct,
            recover_empty: false,
        },
    }
}

pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub(crate) async fn service_with(
    dir: &tempfile::TempDir,
    embedder: impl Embedder + 'static,
    reranker: Option<Arc<dyn Reranker>>,
) -> RetrievalService {
    let config = test_config(dir);
    RetrievalService::init(&config, test_pool().await, Arc::new(embedder), reranker)
        .await
        .unwrap()
}
