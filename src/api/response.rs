//! Response types for the payroll engine API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a missing identity error response.
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::new("AUTH_REQUIRED", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Pairs a status with an error body.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            ),
            EngineError::ConfigParseError { path, message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            ),
            EngineError::Validation { field, message } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "VALIDATION_ERROR",
                    format!("Invalid field '{}': {}", field, message),
                    field,
                ),
            ),
            EngineError::Conflict { worker_id, message } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "CONFLICT",
                    format!("Conflict for worker '{}': {}", worker_id, message),
                    worker_id,
                ),
            ),
            EngineError::Auth { message } => {
                ApiErrorResponse::new(StatusCode::UNAUTHORIZED, ApiError::auth_required(message))
            }
            EngineError::Upstream {
                collaborator,
                message,
            } => ApiErrorResponse::new(
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::with_details(
                    "UPSTREAM_UNAVAILABLE",
                    format!("Upstream '{}' unavailable", collaborator),
                    message,
                ),
            ),
        }
    }
}
