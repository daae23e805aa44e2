// DocQA - Retrieval backend for document question answering

pub mod chunk_store;
pub mod chunker;
pub mod config;
pub mod consistency;
pub mod db;
pub mod embeddings;
pub mod models;
pub mod reranker;
pub mod retrieval;
pub mod routes;
pub mod types;
pub mod utils;
pub mod vector_index;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
// Note: Import specific items from types instead of glob to avoid name conflicts
// e.g., use docqa::types::{AppError, AppResult};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
