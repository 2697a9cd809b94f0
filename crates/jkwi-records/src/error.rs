//! # Record Engine Errors
//!
//! One enum for every failure the engine can report. Lower-level errors are
//! wrapped via `#[from]` so `?` works across crate boundaries.

use jkwi_core::{LocationCode, StatusError, ValidationError};
use jkwi_store::StoreError;
use thiserror::Error;

/// Failure of a record engine operation.
#[derive(Error, Debug)]
pub enum RecordError {
    /// No partition matches the location code.
    #[error("partition not found for code \"{0}\"")]
    PartitionNotFound(String),

    /// No live record with this identifier.
    #[error("record not found: {0}")]
    RecordNotFound(String),

    /// The partition has no template record.
    #[error("template not found for partition \"{0}\"")]
    TemplateNotFound(String),

    /// Stored content failed to parse as a JSON object.
    #[error("malformed record at \"{key}\": {source}")]
    Malformed {
        /// Store key of the offending value.
        key: String,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// The store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// A key that must be fresh is already present.
    #[error("key already exists: \"{key}\"")]
    SequenceCollision {
        /// The occupied key.
        key: String,
    },

    /// The status transition table rejected the change.
    #[error(transparent)]
    Transition(#[from] StatusError),

    /// The persisted status is not a known lifecycle state.
    #[error("record has unrecognised status \"{0}\"")]
    InvalidStatus(String),

    /// An identifier or value failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The new partition code is a prefix of an existing code, or the reverse.
    #[error("location code \"{code}\" overlaps existing partition code \"{existing}\"")]
    DuplicateCode {
        /// Requested code.
        code: LocationCode,
        /// Code already in use.
        existing: LocationCode,
    },

    /// A group or partition name is not usable as a path segment.
    #[error("invalid partition name: \"{0}\"")]
    InvalidName(String),

    /// The update cannot be applied to a record.
    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    /// A record could not be serialized.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
