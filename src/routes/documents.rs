use axum::{extract::State, routing::post, Json, Router};
use serde_json::json;
use tracing::info;

use crate::chunker::chunk_text;
use crate::models::{AppState, IngestRequest, IngestResponse, IngestTextRequest};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/documents", post(add_documents))
        .route("/api/documents/text", post(add_document_text))
        .with_state(state)
}

/// Ingest pre-chunked texts with optional per-chunk metadata.
async fn add_documents(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> AppResult<Json<IngestResponse>> {
    let added = state
        .retrieval
        .add_documents(request.texts, request.metadata)
        .await?;
    let stats = state.retrieval.get_stats().await;
    Ok(Json(IngestResponse {
        added_chunks: added,
        total_vectors: stats.total_vectors,
    }))
}

/// Chunk a whole document and ingest the fragments.
async fn add_document_text(
    State(state): State<AppState>,
    Json(request): Json<IngestTextRequest>,
) -> AppResult<Json<IngestResponse>> {
    let fragments = chunk_text(
        &request.text,
        state.config.retrieval.chunk_size,
        state.config.retrieval.chunk_overlap,
    );
    if fragments.is_empty() {
        return Err(AppError::InvalidRequest(
            "Document contains no chunkable text".to_string(),
        ));
    }
    info!(
        source = %request.source,
        chunks = fragments.len(),
        "Chunked document for ingestion"
    );

    let (texts, metadata): (Vec<String>, Vec<serde_json::Value>) = fragments
        .into_iter()
        .enumerate()
        .map(|(chunk_index, fragment)| {
            let meta = json!({
                "source": request.source,
                "page": fragment.page_number,
                "chunk_index": chunk_index,
            });
            (fragment.text, meta)
        })
        .unzip();

    let added = state.retrieval.add_documents(texts, Some(metadata)).await?;
    let stats = state.retrieval.get_stats().await;
    Ok(Json(IngestResponse {
        added_chunks: added,
        total_vectors: stats.total_vectors,
    }))
}
