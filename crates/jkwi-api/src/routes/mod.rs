//! # API Route Modules
//!
//! - `partitions`: partition listing and provisioning, per-partition
//!   record listing, record creation, statistics, export, and import.
//! - `records`: single-record read, update, status change, soft delete,
//!   and backup listing.
//! - `search`: field-path search across every partition.
//!
//! Engine calls do blocking store I/O, so handlers run them through
//! [`run_engine`] on the blocking thread pool.

pub mod partitions;
pub mod records;
pub mod search;

use std::sync::Arc;

use jkwi_records::{RecordEngine, RecordError};

use crate::error::AppError;
use crate::state::AppState;

/// Run `op` against the engine on tokio's blocking pool.
pub(crate) async fn run_engine<T, F>(state: &AppState, op: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&RecordEngine) -> Result<T, RecordError> + Send + 'static,
{
    let engine = Arc::clone(&state.engine);
    tokio::task::spawn_blocking(move || op(&engine))
        .await
        .map_err(|e| AppError::Internal(format!("engine task failed: {e}")))?
        .map_err(AppError::from)
}
