//! # Identity Newtypes
//!
//! Record identifiers are composite: a location code naming the owning
//! partition, followed by a fixed-width decimal sequence unique within that
//! partition.
//!
//! ```text
//! 00100001 000042      EC101 000001
//! └──code─┘└─seq─┘     └code┘└─seq─┘
//! ```
//!
//! Codes may end in digits (`EC101`), so an identifier is split by width from
//! the right, never by scanning for the first digit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of digits in the sequence suffix of a [`RecordId`].
pub const SEQUENCE_WIDTH: usize = 6;

const MAX_SEQUENCE: u32 = 999_999;
const MAX_CODE_LEN: usize = 16;

// ---------------------------------------------------------------------------
// LocationCode
// ---------------------------------------------------------------------------

/// Alphanumeric code identifying a partition (e.g. a municipality).
///
/// 1–16 ASCII alphanumeric characters. Case is preserved; codes are compared
/// exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationCode(String);

impl LocationCode {
    /// Validate and wrap a location code.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        let valid = !code.is_empty()
            && code.len() <= MAX_CODE_LEN
            && code.bytes().all(|b| b.is_ascii_alphanumeric());
        if valid {
            Ok(Self(code))
        } else {
            Err(ValidationError::InvalidLocationCode(code))
        }
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether either code is a prefix of the other.
    ///
    /// Partition lookup is a prefix match, so two codes that overlap this
    /// way could resolve to each other's partition.
    pub fn overlaps(&self, other: &LocationCode) -> bool {
        self.0.starts_with(&other.0) || other.0.starts_with(&self.0)
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LocationCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LocationCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LocationCode> for String {
    fn from(code: LocationCode) -> Self {
        code.0
    }
}

// ---------------------------------------------------------------------------
// RecordId
// ---------------------------------------------------------------------------

/// Composite record identifier: `<location code><6-digit sequence>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId {
    code: LocationCode,
    sequence: u32,
}

impl RecordId {
    /// Build an identifier from a partition code and a sequence number.
    pub fn new(code: LocationCode, sequence: u32) -> Result<Self, ValidationError> {
        if sequence == 0 || sequence > MAX_SEQUENCE {
            return Err(ValidationError::SequenceOutOfRange(sequence));
        }
        Ok(Self { code, sequence })
    }

    /// Parse `<code><6 digits>`.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidRecordId(s.to_string());
        if !s.is_ascii() || s.len() <= SEQUENCE_WIDTH {
            return Err(invalid());
        }
        let (code, digits) = s.split_at(s.len() - SEQUENCE_WIDTH);
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let code = LocationCode::new(code).map_err(|_| invalid())?;
        let sequence: u32 = digits.parse().map_err(|_| invalid())?;
        Self::new(code, sequence).map_err(|_| invalid())
    }

    /// The owning partition's code.
    pub fn code(&self) -> &LocationCode {
        &self.code
    }

    /// The sequence number within the partition.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:0width$}", self.code, self.sequence, width = SEQUENCE_WIDTH)
    }
}

impl FromStr for RecordId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// The identity recorded in `created_by`, `updated_by` and `deleted_by`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Actor(String);

impl Actor {
    /// Validate and wrap an actor name. Surrounding whitespace is trimmed.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.len() > 128 || trimmed.chars().any(char::is_control) {
            return Err(ValidationError::InvalidActor(name));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The actor used when no caller identity is available.
    pub fn system() -> Self {
        Self("system".to_string())
    }

    /// The actor name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Actor {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Actor> for String {
    fn from(actor: Actor) -> Self {
        actor.0
    }
}
