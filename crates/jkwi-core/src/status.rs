//! # Record Status State Machine
//!
//! ```text
//! Pending ──▶ Active ◀──▶ Inactive
//!    │          │            │
//!    └──────────┴────────────┴──▶ Deleted (terminal)
//! ```
//!
//! Records persist their status as a plain string (`"Pending"`, `"Active"`,
//! ...) inside the role/status namespace. Parsing goes through
//! [`RecordStatus::from_str`], so unknown strings are rejected instead of
//! silently compared by equality. A self-transition is a no-op and always
//! allowed, except out of `Deleted`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{StatusError, ValidationError};

/// Lifecycle status of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordStatus {
    /// Created, awaiting approval. Default for new records.
    #[default]
    Pending,
    /// Approved and in good standing.
    Active,
    /// Temporarily not participating; can be reactivated.
    Inactive,
    /// Soft-deleted and archived (terminal).
    Deleted,
}

impl RecordStatus {
    /// All states, in declaration order.
    pub const ALL: [RecordStatus; 4] = [Self::Pending, Self::Active, Self::Inactive, Self::Deleted];

    /// The persisted string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Deleted => "Deleted",
        }
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Whether the transition table contains `self -> to`.
    pub fn can_transition_to(&self, to: RecordStatus) -> bool {
        use RecordStatus::*;
        match (self, to) {
            (Deleted, _) => false,
            (from, to) if *from == to => true,
            (_, Deleted) => true,
            (Pending, Active) | (Active, Inactive) | (Inactive, Active) => true,
            _ => false,
        }
    }

    /// Validate `self -> to`, returning the target status on success.
    pub fn transition(&self, to: RecordStatus) -> Result<RecordStatus, StatusError> {
        if self.is_terminal() {
            return Err(StatusError::Terminal(*self));
        }
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(StatusError::InvalidTransition { from: *self, to })
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = ValidationError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RecordStatus::*;

    #[test]
    fn default_is_pending() {
        assert_eq!(RecordStatus::default(), Pending);
    }

    #[test]
    fn transition_table() {
        let allowed = [
            (Pending, Pending),
            (Pending, Active),
            (Pending, Deleted),
            (Active, Active),
            (Active, Inactive),
            (Active, Deleted),
            (Inactive, Inactive),
            (Inactive, Active),
            (Inactive, Deleted),
        ];
        for from in RecordStatus::ALL {
            for to in RecordStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn pending_cannot_go_inactive() {
        let err = Pending.transition(Inactive).unwrap_err();
        assert_eq!(err, StatusError::InvalidTransition { from: Pending, to: Inactive });
    }

    #[test]
    fn deleted_is_terminal() {
        assert!(Deleted.is_terminal());
        assert_eq!(Deleted.transition(Active).unwrap_err(), StatusError::Terminal(Deleted));
        assert_eq!(Deleted.transition(Deleted).unwrap_err(), StatusError::Terminal(Deleted));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("active".parse::<RecordStatus>().unwrap(), Active);
        assert_eq!(" Inactive ".parse::<RecordStatus>().unwrap(), Inactive);
        assert!("Suspended".parse::<RecordStatus>().is_err());
    }

    #[test]
    fn serializes_as_persisted_string() {
        assert_eq!(serde_json::to_string(&Active).unwrap(), "\"Active\"");
        for status in RecordStatus::ALL {
            assert_eq!(status.to_string(), status.as_str());
        }
    }
}
