use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::warn;

use crate::consistency::{MigrationReport, RepairReport, SyncReport};
use crate::models::{AppState, MigrateRequest};
use crate::retrieval::StoreStats;
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/stats", get(stats))
        .route("/api/check-sync", get(check_sync))
        .route("/api/repair", post(repair))
        .route("/api/reset", post(reset))
        .route("/api/migrate-index", post(migrate_index))
        .with_state(state)
}

async fn stats(State(state): State<AppState>) -> Json<StoreStats> {
    Json(state.retrieval.get_stats().await)
}

async fn check_sync(State(state): State<AppState>) -> AppResult<Json<SyncReport>> {
    Ok(Json(state.retrieval.check_sync().await?))
}

/// Destructive: backs up the index, clears both stores. Documents must be
/// re-ingested afterwards.
async fn repair(State(state): State<AppState>) -> AppResult<Json<RepairReport>> {
    warn!("Repair requested; clearing vector index and chunk store");
    Ok(Json(state.retrieval.repair().await?))
}

async fn reset(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    warn!("Reset requested; clearing vector index and chunk store");
    state.retrieval.reset().await?;
    Ok(Json(serde_json::json!({ "status": "reset" })))
}

/// Destructive when the metric actually changes.
async fn migrate_index(
    State(state): State<AppState>,
    Json(request): Json<MigrateRequest>,
) -> AppResult<Json<MigrationReport>> {
    Ok(Json(
        state.retrieval.migrate_similarity_metric(request.metric).await?,
    ))
}
