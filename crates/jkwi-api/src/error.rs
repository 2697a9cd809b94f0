//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps record engine errors to HTTP status codes and JSON bodies.
//! Internal error details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jkwi_records::RecordError;
use jkwi_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body or path could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient role (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Conflict with current record state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<jkwi_core::ValidationError> for AppError {
    fn from(err: jkwi_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match &err {
            RecordError::PartitionNotFound(_)
            | RecordError::RecordNotFound(_)
            | RecordError::TemplateNotFound(_) => Self::NotFound(err.to_string()),
            RecordError::Validation(_)
            | RecordError::InvalidStatus(_)
            | RecordError::InvalidUpdate(_)
            | RecordError::InvalidName(_) => Self::Validation(err.to_string()),
            RecordError::Transition(_)
            | RecordError::SequenceCollision { .. }
            | RecordError::DuplicateCode { .. } => Self::Conflict(err.to_string()),
            RecordError::Storage(StoreError::InvalidKey(_)) => Self::BadRequest(err.to_string()),
            RecordError::Storage(StoreError::Io { .. })
            | RecordError::Malformed { .. }
            | RecordError::Serialize(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use jkwi_core::{LocationCode, RecordStatus, StatusError};

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::Validation("x".into()), StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT, "CONFLICT"),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code));
        }
    }

    #[test]
    fn record_errors_map_to_http_classes() {
        let not_found = AppError::from(RecordError::RecordNotFound("EC101000001".into()));
        assert!(matches!(not_found, AppError::NotFound(_)));

        let transition = AppError::from(RecordError::Transition(StatusError::InvalidTransition {
            from: RecordStatus::Pending,
            to: RecordStatus::Inactive,
        }));
        assert!(matches!(transition, AppError::Conflict(_)));

        let dup = AppError::from(RecordError::DuplicateCode {
            code: LocationCode::new("EC10").unwrap(),
            existing: LocationCode::new("EC101").unwrap(),
        });
        assert!(matches!(dup, AppError::Conflict(_)));

        let collision = AppError::from(RecordError::SequenceCollision { key: "k".into() });
        assert!(matches!(collision, AppError::Conflict(_)));

        let io = AppError::from(RecordError::Storage(StoreError::Io {
            key: "k".into(),
            source: std::io::Error::other("disk gone"),
        }));
        assert!(matches!(io, AppError::Internal(_)));

        let invalid = AppError::from(RecordError::InvalidUpdate("not an object".into()));
        assert!(matches!(invalid, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn into_response_not_found() {
        let (status, body) = response_parts(AppError::NotFound("record EC101000001".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.code, "NOT_FOUND");
        assert!(body.error.message.contains("EC101000001"));
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) =
            response_parts(AppError::Internal("disk /var/data failed".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert!(!body.error.message.contains("/var/data"));
        assert_eq!(body.error.message, "An internal error occurred");
    }
}
