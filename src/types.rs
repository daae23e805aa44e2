// Shared error types for the retrieval pipeline

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::vector_index::IndexError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Duplicate ordinal {0} in chunk store")]
    DuplicateOrdinal(i64),

    #[error("Vector index error: {0}")]
    Index(#[from] IndexError),

    #[error("Index and chunk store are out of sync: {vectors} vectors, {records} records")]
    DesyncDetected { vectors: usize, records: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmbeddingUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::DesyncDetected { .. } => StatusCode::CONFLICT,
            AppError::DimensionMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_)
            | AppError::DuplicateOrdinal(_)
            | AppError::Index(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
