//! # jkwi-core: Foundational Types for JKWI Records
//!
//! Leaf crate of the workspace. Defines the identifier newtypes and value
//! types every other crate shares:
//!
//! - [`LocationCode`]: the alphanumeric prefix naming a partition
//!   (a municipality code such as `00100001`, or `EC101`).
//! - [`RecordId`]: a location code followed by a six-digit sequence.
//! - [`Actor`]: who performed a mutation, recorded in `system_info`.
//! - [`Timestamp`]: UTC, seconds precision, `YYYY-MM-DDTHH:MM:SSZ`.
//! - [`RecordStatus`]: closed lifecycle enum with a validated transition table.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jkwi-*` crates.
//! - No `.unwrap()` outside tests.
//! - String identifiers are validated at construction; a `RecordId` can only
//!   be built from a valid `LocationCode` and an in-range sequence.

pub mod error;
pub mod identity;
pub mod status;
pub mod temporal;

pub use error::{StatusError, ValidationError};
pub use identity::{Actor, LocationCode, RecordId, SEQUENCE_WIDTH};
pub use status::RecordStatus;
pub use temporal::Timestamp;
