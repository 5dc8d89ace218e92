//! Cross-cutting error type
//!
//! Feature slices map their own error enums to responses; `AppError` covers
//! what sits outside them: authentication, role checks, health and startup.

use crate::api::response::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Result type alias for server operations
pub type ServerResult<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Missing or invalid bearer token")]
    Unauthorized,

    #[error("Insufficient permissions: {0}")]
    Forbidden(String),

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Identity(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match &self {
            AppError::Unauthorized => ErrorResponse::new("UNAUTHORIZED", self.to_string()),
            AppError::Forbidden(_) => ErrorResponse::new("FORBIDDEN", self.to_string()),
            AppError::NotFound(_) => ErrorResponse::new("NOT_FOUND", self.to_string()),
            AppError::Identity(message) => {
                tracing::error!("Identity provider error: {}", message);
                ErrorResponse::new("UPSTREAM_ERROR", "The identity provider is unavailable")
            },
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ErrorResponse::new("INTERNAL_ERROR", "A database error occurred")
            },
            AppError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred")
            },
        };

        (status, Json(error)).into_response()
    }
}
