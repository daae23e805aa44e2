use axum::{extract::State, routing::post, Json, Router};
use tracing::info;

use crate::models::{AppState, QueryResponse, SearchRequest, SearchResponse};
use crate::retrieval::RetrievalService;
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", post(search))
        .route("/api/query", post(query))
        .with_state(state)
}

/// Raw similarity search, no reranking.
async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> AppResult<Json<SearchResponse>> {
    let top_k = request.top_k.unwrap_or(state.config.retrieval.top_k);
    let threshold = request
        .threshold
        .unwrap_or(state.config.retrieval.similarity_threshold);

    let results = state.retrieval.search(&request.query, top_k, threshold).await?;
    let count = results.len();
    Ok(Json(SearchResponse { results, count }))
}

/// Full retrieval with reranking and formatted context.
///
/// Two-attempt escalation: when nothing clears the requested threshold, the
/// query is retried once at threshold 0.0 with doubled top_k, accepting
/// weaker matches over returning nothing. There is no further retry.
async fn query(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> AppResult<Json<QueryResponse>> {
    let top_k = request.top_k.unwrap_or(state.config.retrieval.top_k);
    let threshold = request
        .threshold
        .unwrap_or(state.config.retrieval.similarity_threshold);

    let mut results = state
        .retrieval
        .retrieve(&request.query, top_k, threshold)
        .await?;

    let mut widened = false;
    if results.is_empty() && threshold > 0.0 {
        info!(%threshold, "No results above threshold; widening once");
        results = state.retrieval.retrieve(&request.query, top_k * 2, 0.0).await?;
        widened = true;
    }

    let context = RetrievalService::format_context(&results);
    Ok(Json(QueryResponse {
        results,
        context,
        widened,
    }))
}
