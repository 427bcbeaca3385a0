//! Response types for the attendance API.
//!
//! This module defines the error response structures and the mapping from
//! engine errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
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
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    /// A 401 response for a caller without a usable identity.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: ApiError::new("UNAUTHENTICATED", message),
        }
    }

    /// A 404 response.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: ApiError::new("NOT_FOUND", message),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::InvalidPolicy { field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "VALIDATION_ERROR",
                    message,
                    format!("The policy field '{}' is out of range or inconsistent", field),
                ),
            ),
            EngineError::InsufficientBalance { .. } => {
                (StatusCode::CONFLICT, ApiError::new("INSUFFICIENT_BALANCE", message))
            }
            EngineError::LeaveRequestNotFound { .. } => {
                (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
            }
            EngineError::AlreadyProcessed { .. } => {
                (StatusCode::CONFLICT, ApiError::new("ALREADY_PROCESSED", message))
            }
            EngineError::TransactionConflict { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::with_details(
                    "TRANSACTION_CONFLICT",
                    message,
                    "The record was modified concurrently; retry the request",
                ),
            ),
            EngineError::InvalidLeaveRequest { .. } => {
                (StatusCode::BAD_REQUEST, ApiError::new("INVALID_LEAVE_REQUEST", message))
            }
            EngineError::OutsideGeofence { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ApiError::new("OUTSIDE_GEOFENCE", message))
            }
            EngineError::InaccurateLocation { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ApiError::new("INACCURATE_LOCATION", message))
            }
            EngineError::Forbidden { .. } => {
                (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", message))
            }
            EngineError::StoreUnavailable { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::new("STORE_UNAVAILABLE", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}
