//! # Custom Extractors & Validation
//!
//! The [`Validate`] trait for request DTOs, JSON body extraction that maps
//! rejections to [`AppError::BadRequest`], and path-segment parsing for
//! record identifiers and location codes.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use jkwi_core::{LocationCode, RecordId};

use crate::error::AppError;

/// Request types that check business rules beyond what serde checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Parse a `{id}` path segment.
pub fn parse_record_id(raw: &str) -> Result<RecordId, AppError> {
    RecordId::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Parse a `{code}` path segment.
pub fn parse_location_code(raw: &str) -> Result<LocationCode, AppError> {
    LocationCode::new(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}
