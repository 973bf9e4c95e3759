//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::{DomainError, ValidationErrors};

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Installment not found: {0}")]
    InstallmentNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Email already registered")]
    EmailTaken,

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Per-field validation messages, present only for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ValidationErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details, fields) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_request",
                Some(msg.clone()),
                None,
            ),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                None,
                Some(errors.clone()),
            ),
            AppError::EmailTaken => (StatusCode::BAD_REQUEST, "email_taken", None, None),

            // 401 Unauthorized
            AppError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "invalid_api_key", None, None),

            // 403 Forbidden
            AppError::PermissionDenied => {
                (StatusCode::FORBIDDEN, "permission_denied", None, None)
            }

            // 404 Not Found
            AppError::InstallmentNotFound(id) => (
                StatusCode::NOT_FOUND,
                "installment_not_found",
                Some(id.clone()),
                None,
            ),
            AppError::UserNotFound(id) => (
                StatusCode::NOT_FOUND,
                "user_not_found",
                Some(id.clone()),
                None,
            ),

            // Domain errors: business-rule rejections surface as 400s with
            // the rule's message, capability denials as a generic 403
            AppError::Domain(domain_err) => {
                if domain_err.is_client_error() {
                    (
                        StatusCode::BAD_REQUEST,
                        "invalid_payment",
                        Some(domain_err.to_string()),
                        None,
                    )
                } else {
                    (StatusCode::FORBIDDEN, "permission_denied", None, None)
                }
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None, None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None, None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None, None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
            fields,
        };

        (status, Json(body)).into_response()
    }
}
