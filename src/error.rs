// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No user is currently logged in.")]
    NoSession,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Please verify your email before logging in.")]
    EmailNotVerified,

    #[error("{0}")]
    Validation(String),

    #[error("You can only create up to {0} folders.")]
    LimitExceeded(usize),

    #[error("Folder name already exists.")]
    DuplicateName(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Authentication provider rejected the request; message is shown to the user as-is.
    #[error("{0}")]
    Auth(String),

    /// An entry write failed; the store's message is passed through.
    #[error("{0}")]
    Save(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message for `Conflict` when a folder changed between read and write.
    pub const STALE_REVISION: &'static str =
        "Folder was modified by another session. Reload and try again.";

    /// Status code and machine-readable error code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NoSession => (StatusCode::UNAUTHORIZED, "no_session"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::EmailNotVerified => (StatusCode::FORBIDDEN, "email_not_verified"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::LimitExceeded(_) => (StatusCode::UNPROCESSABLE_ENTITY, "limit_exceeded"),
            AppError::DuplicateName(_) => (StatusCode::CONFLICT, "duplicate_name"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::Auth(_) => (StatusCode::UNAUTHORIZED, "auth_error"),
            AppError::Save(_) => (StatusCode::BAD_GATEWAY, "save_error"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::Identity(_) => (StatusCode::BAD_GATEWAY, "identity_error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Message safe to show to the user, if any.
    ///
    /// Store and internal failures are logged instead of returned.
    pub fn user_message(&self) -> Option<String> {
        match self {
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                None
            }
            AppError::Identity(msg) => {
                tracing::error!(error = %msg, "Identity provider error");
                None
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                None
            }
            other => Some(other.to_string()),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_code();
        let body = ErrorResponse {
            error: error.to_string(),
            details: self.user_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
