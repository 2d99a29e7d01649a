//! Service-wide error taxonomy.
//!
//! Business-rule violations are raised where they are detected and travel
//! unchanged to the HTTP boundary, which maps each kind to a status code
//! here. Some access and interval violations are reported as `NotFound`
//! on purpose: a caller who is not allowed to see a resource cannot tell
//! it apart from one that does not exist.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde::Serialize;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing entity, or a violation hidden behind "missing" so the
    /// resource cannot be enumerated.
    #[error("{0}")]
    NotFound(String),

    /// The request is well formed but the current state forbids it.
    #[error("{0}")]
    Conflict(String),

    /// Malformed input rejected before any state is touched.
    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Conflict(message) => (StatusCode::CONFLICT, message),
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Database(e) => {
                error!("database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
