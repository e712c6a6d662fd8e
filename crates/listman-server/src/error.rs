//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use listman_core::{CoreError, FieldError, ListId};
use listman_storage::StorageError;

use crate::concurrency::LockError;
use crate::messages;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "LOCKED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured details (field errors, busy lists).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Folder or list name rejected by the naming policy (400).
    #[error("{message}")]
    InvalidName { message: String, reason: String },

    /// Contact payload failed validation (400).
    #[error("validation failed")]
    ValidationFailed(Vec<FieldError>),

    /// Target list, or a list inside the target folder, is locked or in use (403).
    #[error("{message}")]
    Locked { message: String, lists: Vec<ListId> },

    /// Caller lacks the required role or sent a bad forgery token (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource conflict (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    fn detail(code: &str, message: impl Into<String>) -> ApiErrorDetail {
        ApiErrorDetail {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, Self::detail("NOT_FOUND", msg)),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Self::detail("BAD_REQUEST", msg))
            }
            ApiError::InvalidName { message, reason } => (
                StatusCode::BAD_REQUEST,
                ApiErrorDetail {
                    details: Some(serde_json::json!({ "reason": reason })),
                    ..Self::detail("INVALID_NAME", message)
                },
            ),
            ApiError::ValidationFailed(errors) => (
                StatusCode::BAD_REQUEST,
                ApiErrorDetail {
                    details: serde_json::to_value(errors).ok(),
                    ..Self::detail(
                        "VALIDATION_FAILED",
                        format!("{} validation error(s)", errors.len()),
                    )
                },
            ),
            ApiError::Locked { message, lists } => (
                StatusCode::FORBIDDEN,
                ApiErrorDetail {
                    details: Some(serde_json::json!({ "lists": lists })),
                    ..Self::detail("LOCKED", message)
                },
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, Self::detail("FORBIDDEN", msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, Self::detail("CONFLICT", msg)),
            ApiError::InternalError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Self::detail("INTERNAL_ERROR", msg),
            ),
        };

        let body = serde_json::json!({
            "success": false,
            "error": detail,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ListNotFound { .. }
            | CoreError::FolderNotFound { .. }
            | CoreError::ContactNotFound { .. } => ApiError::NotFound(err.to_string()),
            CoreError::NameConflict { .. } => ApiError::Conflict(err.to_string()),
            CoreError::InvalidName { reason, .. } => ApiError::InvalidName {
                message: "Invalid name. Please use permitted characters.".to_string(),
                reason,
            },
            CoreError::InvalidInput { .. } => ApiError::BadRequest(err.to_string()),
            CoreError::ValidationFailed(errors) => ApiError::ValidationFailed(errors),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::ListNotFound(_)
            | StorageError::FolderNotFound(_)
            | StorageError::ContactNotFound(_) => ApiError::NotFound(err.to_string()),
            StorageError::IntegrityError { .. } => ApiError::Conflict(err.to_string()),
            _ => {
                tracing::error!(error = %err, "storage failure");
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

impl From<LockError> for ApiError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::AlreadyLocked { list_id, .. } | LockError::InUse { list_id } => {
                ApiError::Locked {
                    message: messages::LIST_BUSY.to_string(),
                    lists: vec![list_id],
                }
            }
            LockError::Busy { lists } => ApiError::Locked {
                message: messages::FOLDER_CONTENTS_BUSY.to_string(),
                lists,
            },
        }
    }
}
