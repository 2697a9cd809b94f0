//! # jkwi-records: The Record Engine
//!
//! Everything between a caller's `(id, update)` and the bytes in a
//! [`RecordStore`](jkwi_store::RecordStore):
//!
//! - [`layout`]: the persisted key naming convention.
//! - [`locator`]: location code → partition, live record enumeration,
//!   next sequence.
//! - [`merge`]: deep right-biased JSON merge.
//! - [`audit`]: `system_info` stamping and status history.
//! - [`engine`]: [`RecordEngine`]: create, read, update with backup,
//!   status changes, soft delete, partition provisioning.
//! - [`query`]: listing, search and partition statistics.
//! - [`transfer`]: partition export bundles and import.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use jkwi_core::{Actor, LocationCode};
//! use jkwi_records::RecordEngine;
//! use jkwi_store::MemoryStore;
//! use serde_json::json;
//!
//! let engine = RecordEngine::new(Arc::new(MemoryStore::new()));
//! let code = LocationCode::new("EC101").unwrap();
//! engine.create_partition("EC", &code, "Test", None, &Actor::system()).unwrap();
//!
//! let id = engine
//!     .create(&code, &json!({"member_info": {"full_name": "A"}}), &Actor::system())
//!     .unwrap();
//! assert_eq!(id.to_string(), "EC101000001");
//! ```

pub mod audit;
pub mod engine;
pub mod error;
pub mod field;
pub mod layout;
pub mod locator;
pub mod merge;
pub mod query;
pub mod template;
pub mod transfer;

pub use engine::{BackupSummary, EngineConfig, RecordEngine};
pub use error::RecordError;
pub use field::FieldPath;
pub use layout::Partition;
pub use locator::{RecordLocator, RecordSummary};
pub use merge::{merge, merge_in_place};
pub use query::{PartitionStats, SearchQuery};
pub use transfer::{ExportBundle, ImportReport};
