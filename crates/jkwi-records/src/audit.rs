//! # Audit Stamping
//!
//! Lifecycle metadata lives in the reserved `system_info` namespace of every
//! record:
//!
//! | Field          | Written by                        |
//! |----------------|-----------------------------------|
//! | `created_date` | create                            |
//! | `created_by`   | create                            |
//! | `last_updated` | create, update                    |
//! | `updated_by`   | create, update                    |
//! | `backup_count` | create (0), update (+1), import   |
//! | `deleted_date` | soft delete                       |
//! | `deleted_by`   | soft delete                       |
//!
//! Status changes additionally append `{from, to, date, by}` to the
//! top-level `status_history` list.

use jkwi_core::{Actor, RecordStatus, Timestamp};
use serde_json::{json, Value};

use crate::error::RecordError;
use crate::field::FieldPath;

/// Reserved namespace for lifecycle metadata.
pub const SYSTEM_INFO: &str = "system_info";
/// Top-level list of status changes.
pub const STATUS_HISTORY: &str = "status_history";

fn system(field: &str) -> FieldPath {
    FieldPath::of(&[SYSTEM_INFO, field])
}

/// Current `system_info.backup_count`, or 0 when absent or not a number.
pub fn backup_count(record: &Value) -> u64 {
    system("backup_count")
        .get(record)
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// Stamp a freshly created record.
pub fn stamp_created(record: &mut Value, actor: &Actor, now: Timestamp) {
    let now = Value::String(now.to_iso8601());
    let actor = Value::String(actor.to_string());
    system("created_date").set(record, now.clone());
    system("last_updated").set(record, now);
    system("created_by").set(record, actor.clone());
    system("updated_by").set(record, actor);
    system("backup_count").set(record, json!(0));
}

/// Stamp an update that produced backup number `backup_count`.
pub fn stamp_updated(record: &mut Value, actor: &Actor, now: Timestamp, backup_count: u64) {
    system("last_updated").set(record, Value::String(now.to_iso8601()));
    system("updated_by").set(record, Value::String(actor.to_string()));
    system("backup_count").set(record, json!(backup_count));
}

/// Stamp a soft delete.
pub fn stamp_deleted(record: &mut Value, actor: &Actor, now: Timestamp) {
    system("deleted_date").set(record, Value::String(now.to_iso8601()));
    system("deleted_by").set(record, Value::String(actor.to_string()));
}

/// Record a creation date on a partition template.
pub fn stamp_template(record: &mut Value, actor: &Actor, now: Timestamp) {
    system("created_date").set(record, Value::String(now.to_iso8601()));
    system("created_by").set(record, Value::String(actor.to_string()));
}

/// Append a status change to `status_history`.
///
/// A missing or non-list history is replaced by a new list.
pub fn push_status_change(
    record: &mut Value,
    from: RecordStatus,
    to: RecordStatus,
    actor: &Actor,
    now: Timestamp,
) {
    let entry = json!({
        "from": from.as_str(),
        "to": to.as_str(),
        "date": now.to_iso8601(),
        "by": actor.as_str(),
    });
    let path = FieldPath::of(&[STATUS_HISTORY]);
    match path.get(record).and_then(Value::as_array) {
        Some(existing) => {
            let mut history = existing.clone();
            history.push(entry);
            path.set(record, Value::Array(history));
        }
        None => path.set(record, Value::Array(vec![entry])),
    }
}

/// Lifecycle status stored at `field`. A missing field is `Pending`.
pub fn read_status(record: &Value, field: &FieldPath) -> Result<RecordStatus, RecordError> {
    match field.get(record) {
        None | Some(Value::Null) => Ok(RecordStatus::Pending),
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| RecordError::InvalidStatus(s.clone())),
        Some(other) => Err(RecordError::InvalidStatus(other.to_string())),
    }
}
