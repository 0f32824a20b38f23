//! Handler error type and its JSON response shape

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::cache::CacheError;

/// Application-level error type for HTTP handlers
///
/// Implements [`IntoResponse`] to produce consistent JSON error responses
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Reading or writing the character cache failed
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// No route matched the request path
    #[error("Not found")]
    NotFound,
}

/// Convenience type alias for handler return values
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Cache(err) => {
                tracing::error!(error = %err, "Character cache failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CACHE_ERROR",
                    "The character cache could not be read or written".to_string(),
                )
            }
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "No such endpoint".to_string(),
            ),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
