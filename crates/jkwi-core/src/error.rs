//! # Error Types
//!
//! Validation and state-machine errors shared by every crate. Storage and
//! engine errors live next to the code that raises them (`jkwi-store`,
//! `jkwi-records`) and wrap these via `#[from]`.

use thiserror::Error;

use crate::status::RecordStatus;

/// A value failed format validation at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Location code is empty, too long, or not ASCII alphanumeric.
    #[error("invalid location code: \"{0}\" (expected 1-16 ASCII alphanumeric characters)")]
    InvalidLocationCode(String),

    /// Record identifier does not end in a six-digit sequence after a valid code.
    #[error("invalid record id: \"{0}\" (expected <location code><6 digits>)")]
    InvalidRecordId(String),

    /// Sequence number does not fit the fixed-width suffix.
    #[error("sequence {0} out of range (1..=999999)")]
    SequenceOutOfRange(u32),

    /// Actor name is empty or contains control characters.
    #[error("invalid actor: \"{0}\"")]
    InvalidActor(String),

    /// Status string is not one of the known lifecycle states.
    #[error("unknown record status: \"{0}\" (expected Pending, Active, Inactive or Deleted)")]
    UnknownStatus(String),

    /// Timestamp string is not a UTC RFC 3339 value.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// A record status change was rejected by the transition table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// The transition is not in the table.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: RecordStatus,
        /// Requested status.
        to: RecordStatus,
    },

    /// The record is already deleted.
    #[error("record is {0} and cannot change status")]
    Terminal(RecordStatus),
}
