//! # jkwi-store: Record Store Abstraction
//!
//! The record engine only ever talks to storage through [`RecordStore`]:
//! four byte-level operations over `/`-separated relative keys. Anything that
//! can read, write, list and delete blobs by key can back the engine.
//!
//! ## Backends
//!
//! | Backend          | Keys map to                         | Used by                  |
//! |------------------|-------------------------------------|--------------------------|
//! | [`LocalFsStore`] | files under a root directory        | CLI, server (`fs`)       |
//! | [`MemoryStore`]  | a sorted in-process map             | tests, server (`memory`) |
//!
//! ## Crate Policy
//!
//! - No knowledge of record layout or JSON. Keys and bytes only.
//! - Every key passes [`validate_key`] before it touches a backend.

pub mod backend;
pub mod error;
pub mod fs;
pub mod memory;

pub use backend::{validate_key, RecordStore};
pub use error::StoreError;
pub use fs::LocalFsStore;
pub use memory::MemoryStore;
