//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/api/documents` - Chunk ingestion
//! - `/api/search` - Similarity search (no reranking)
//! - `/api/query` - Full retrieval with reranking and formatted context
//! - `/api/stats`, `/api/check-sync`, `/api/repair`, `/api/reset`,
//!   `/api/migrate-index` - Store administration
//! - `/api/health` - Health checks

pub mod admin;
pub mod documents;
pub mod health;
pub mod query;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = build_cors(&state.config.server.cors_allowed_origins);

    Router::new()
        .merge(documents::router(state.clone()))
        .merge(query::router(state.clone()))
        .merge(admin::router(state.clone()))
        .merge(health::router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn build_cors(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
