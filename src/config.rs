use anyhow::Result;
use serde::Deserialize;
use std::env;

use crate::vector_index::SimilarityMetric;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub embedding: EmbeddingConfig,
    pub reranker: RerankerConfig,
    pub retrieval: RetrievalConfig,
    pub vector_store: VectorStoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub dimension: usize,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RerankerConfig {
    pub enabled: bool,
    pub model: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub similarity_threshold: f32,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VectorStoreConfig {
    pub dir: String,
    pub index_name: String,
    pub metric: SimilarityMetric,
    /// Opt-in recovery: back up a corrupt index file and start empty
    /// instead of refusing to boot.
    pub recover_empty: bool,
}

impl VectorStoreConfig {
    pub fn index_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.dir).join(&self.index_name)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("CORS_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://./data/app.db".to_string()),
                max_connections: env::var("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
                min_connections: env::var("DB_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()?,
            },
            embedding: EmbeddingConfig {
                provider: env::var("EMBEDDING_PROVIDER").unwrap_or_else(|_| "nomic".to_string()),
                model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "nomic-embed-text-v1".to_string()),
                dimension: env::var("EMBEDDING_DIMENSION")
                    .unwrap_or_else(|_| "768".to_string())
                    .parse()?,
                api_key: env::var("EMBEDDING_API_KEY").unwrap_or_default(),
            },
            reranker: RerankerConfig {
                enabled: env::var("RERANKER_ENABLED")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()?,
                model: env::var("RERANKER_MODEL")
                    .unwrap_or_else(|_| "rerank-v3.5".to_string()),
                api_key: env::var("COHERE_API_KEY").unwrap_or_default(),
            },
            retrieval: RetrievalConfig {
                top_k: env::var("TOP_K_RESULTS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
                similarity_threshold: env::var("SIMILARITY_THRESHOLD")
                    .unwrap_or_else(|_| "0.5".to_string())
                    .parse()?,
                chunk_size: env::var("CHUNK_SIZE")
                    .unwrap_or_else(|_| "600".to_string())
                    .parse()?,
                chunk_overlap: env::var("CHUNK_OVERLAP")
                    .unwrap_or_else(|_| "100".to_string())
                    .parse()?,
            },
            vector_store: VectorStoreConfig {
                dir: env::var("VECTOR_STORE_DIR")
                    .unwrap_or_else(|_| "./data/vector_store".to_string()),
                index_name: env::var("VECTOR_STORE_INDEX_NAME")
                    .unwrap_or_else(|_| "vectors.idx".to_string()),
                metric: match env::var("SIMILARITY_METRIC")
                    .unwrap_or_else(|_| "inner_product".to_string())
                    .as_str()
                {
                    "l2" | "squared_l2" => SimilarityMetric::SquaredL2,
                    _ => SimilarityMetric::InnerProduct,
                },
                recover_empty: env::var("VECTOR_INDEX_RECOVER_EMPTY")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()?,
            },
        })
    }
}
