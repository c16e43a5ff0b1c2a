//! Error types for timetable-orchestrator
//!
//! Maps the failure taxonomy onto HTTP status codes:
//! - `NotFound` → 404
//! - `Validation` → 400
//! - `Conflict` → 409
//! - `EngineUnavailable` → 503 (retry the whole generation)
//! - `EngineBadResponse` → 502 (needs operator attention)
//! - `ReconciliationFailure` → 500 (replay the whole approval)
//! - `Internal` → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::engine_client::EngineError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing configuration, candidate or live document (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Malformed partition key or request body (400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Superseded generation or approval version mismatch (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Engine unreachable or timed out (503)
    #[error("Optimization engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Engine answered with unusable output (502)
    #[error("Optimization engine returned a bad response: {0}")]
    EngineBadResponse(String),

    /// Live view reconciliation did not complete (500)
    #[error("Reconciliation failed: {0}")]
    ReconciliationFailure(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::EngineUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::EngineBadResponse(_) => StatusCode::BAD_GATEWAY,
            ApiError::ReconciliationFailure(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::EngineUnavailable(_) => "ENGINE_UNAVAILABLE",
            ApiError::EngineBadResponse(_) => "ENGINE_BAD_RESPONSE",
            ApiError::ReconciliationFailure(_) => "RECONCILIATION_FAILURE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller may safely replay the whole operation
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::EngineUnavailable(_) | ApiError::ReconciliationFailure(_)
        )
    }
}

impl From<timetable_common::Error> for ApiError {
    fn from(err: timetable_common::Error) -> Self {
        use timetable_common::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Unavailable(_) | EngineError::Timeout(_) => {
                ApiError::EngineUnavailable(err.to_string())
            }
            EngineError::BadResponse(_) => ApiError::EngineBadResponse(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::EngineUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::EngineBadResponse("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::ReconciliationFailure("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_common_errors_keep_their_meaning() {
        let err: ApiError = timetable_common::Error::NotFound("cfg".into()).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = timetable_common::Error::InvalidInput("bad".into()).into();
        assert!(matches!(err, ApiError::Validation(_)));

        let err: ApiError = timetable_common::Error::Internal("boom".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_engine_errors_map_to_gateway_statuses() {
        let err: ApiError = EngineError::Timeout(120).into();
        assert!(matches!(err, ApiError::EngineUnavailable(_)));
        assert!(err.is_retryable());

        let err: ApiError = EngineError::BadResponse("empty".into()).into();
        assert!(matches!(err, ApiError::EngineBadResponse(_)));
        assert!(!err.is_retryable());
    }
}
