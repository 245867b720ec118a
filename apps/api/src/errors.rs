use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::jobs::envelope::JobsEnvelope;
use crate::models::SourceCounts;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request pipeline itself broke. Rendered as a degraded jobs envelope,
    /// not as a transport error.
    #[error("Aggregation failed: {message}")]
    Aggregation {
        message: String,
        sources: SourceCounts,
    },

    /// The query string did not decode. Also rendered as a degraded envelope.
    #[error("Invalid query string: {message}")]
    InvalidQuery {
        message: String,
        sources: SourceCounts,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(msg) => {
                let body = Json(json!({
                    "error": {
                        "code": "NOT_FOUND",
                        "message": msg
                    }
                }));
                (StatusCode::NOT_FOUND, body).into_response()
            }
            AppError::Aggregation { message, sources } => {
                tracing::error!("Aggregation error: {message}");
                let body = JobsEnvelope::degraded(sources, "Failed to fetch jobs");
                (StatusCode::OK, Json(body)).into_response()
            }
            AppError::InvalidQuery { message, sources } => {
                tracing::warn!("Rejected query string: {message}");
                let body = JobsEnvelope::degraded(sources, format!("Invalid query string: {message}"));
                (StatusCode::OK, Json(body)).into_response()
            }
        }
    }
}
