//! Response types for the pilot pay API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

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

    /// Creates an invalid query parameter error response.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::new("INVALID_QUERY", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
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
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::AirportDataError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("AIRPORT_DATA_ERROR", "Airport reference data error", message),
            ),
            EngineError::MalformedInput { line, message } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "MALFORMED_INPUT",
                    format!("Malformed roster input at line {}", line),
                    message,
                ),
            ),
            EngineError::UnresolvedAirport { code } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details(
                    "UNRESOLVED_AIRPORT",
                    message,
                    format!("Add '{}' to the airport reference table", code),
                ),
            ),
            EngineError::NoApplicableRule { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("NO_APPLICABLE_RULE", message),
            ),
            EngineError::AmountOverflow { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("AMOUNT_OVERFLOW", message),
            ),
            EngineError::ExportFailure { format, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("EXPORT_ERROR", format!("Failed to export {}", format), message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}
