//! # Record Engine
//!
//! Create, read, update and soft-delete records inside partitions.
//!
//! ## Update Pipeline
//!
//! ```text
//! apply_update(id, update, actor)
//!   1. refuse writes to system_info / status_history
//!   2. resolve partition, load current record        (absent: RecordNotFound)
//!   3. merge update into a copy of the current record
//!   4. validate merged status and id                 (no write on failure)
//!   5. write current bytes verbatim to backups/<id>_backup_<n:06>.json
//!   6. stamp last_updated, updated_by, backup_count = n
//!   7. replace the live record
//! ```
//!
//! ## Concurrency
//!
//! Mutations take a per-partition `parking_lot::Mutex` from a lazily filled
//! lock table, so sequence allocation and read-modify-write cycles never
//! interleave within one process. Keys that must be fresh (new records,
//! backups, archive entries) are checked before writing; a key written by
//! another process surfaces as [`RecordError::SequenceCollision`] instead of
//! being overwritten.

use std::collections::HashMap;
use std::sync::Arc;

use jkwi_core::{Actor, LocationCode, RecordId, RecordStatus, StatusError, Timestamp, ValidationError};
use jkwi_store::RecordStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::audit;
use crate::error::RecordError;
use crate::field::FieldPath;
use crate::layout::{self, BackupSuffix, Partition};
use crate::locator::RecordLocator;
use crate::merge::merge_in_place;
use crate::template::member_template;

/// Where the engine finds well-known fields inside a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Record identifier. The template id is stored next to it.
    pub id_field: FieldPath,
    /// Lifecycle status.
    pub status_field: FieldPath,
    /// Division used by partition statistics.
    pub division_field: FieldPath,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            id_field: FieldPath::of(&["member_info", "member_id"]),
            status_field: FieldPath::of(&["jkwi_info", "status"]),
            division_field: FieldPath::of(&["jkwi_info", "division"]),
        }
    }
}

/// One pre-update snapshot of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupSummary {
    /// Store key of the snapshot.
    pub key: String,
    /// Backup counter, or `None` for snapshots named by older tooling.
    pub counter: Option<u64>,
    /// The raw suffix after `_backup_`.
    pub label: String,
}

/// The record engine. Cheap to share behind an `Arc`.
pub struct RecordEngine {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) locator: RecordLocator,
    pub(crate) config: EngineConfig,
    locks: Mutex<HashMap<LocationCode, Arc<Mutex<()>>>>,
    provisioning: Mutex<()>,
}

impl std::fmt::Debug for RecordEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RecordEngine {
    /// Create an engine with the default field layout.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Create an engine with a custom field layout.
    pub fn with_config(store: Arc<dyn RecordStore>, config: EngineConfig) -> Self {
        Self {
            locator: RecordLocator::new(Arc::clone(&store)),
            store,
            config,
            locks: Mutex::new(HashMap::new()),
            provisioning: Mutex::new(()),
        }
    }

    /// The partition locator.
    pub fn locator(&self) -> &RecordLocator {
        &self.locator
    }

    /// The field layout.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn partition_lock(&self, code: &LocationCode) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.lock().entry(code.clone()).or_default())
    }

    // ── Partitions ──────────────────────────────────────────────────────

    /// Every partition, sorted by group then folder.
    pub fn partitions(&self) -> Result<Vec<Partition>, RecordError> {
        Ok(self.locator.partitions()?)
    }

    /// Resolve `code` or fail with `PartitionNotFound`.
    pub fn partition(&self, code: &LocationCode) -> Result<Partition, RecordError> {
        self.locator
            .resolve(code)?
            .ok_or_else(|| RecordError::PartitionNotFound(code.to_string()))
    }

    /// Provision `<group>/<code>-<name>/` with a template.
    ///
    /// `template` defaults to [`member_template`]. The code must not overlap
    /// (be a prefix of, or have as prefix) any existing partition code.
    pub fn create_partition(
        &self,
        group: &str,
        code: &LocationCode,
        name: &str,
        template: Option<Value>,
        actor: &Actor,
    ) -> Result<Partition, RecordError> {
        for segment in [group, name] {
            if !layout::is_valid_segment(segment) {
                return Err(RecordError::InvalidName(segment.to_string()));
            }
        }
        let mut template = template.unwrap_or_else(member_template);
        if !template.is_object() {
            return Err(RecordError::InvalidUpdate(
                "template must be a JSON object".into(),
            ));
        }

        let _guard = self.provisioning.lock();
        if let Some(existing) = self
            .locator
            .partitions()?
            .into_iter()
            .find(|p| p.code.overlaps(code))
        {
            return Err(RecordError::DuplicateCode {
                code: code.clone(),
                existing: existing.code,
            });
        }

        let partition = Partition::new(group, code.clone(), name);
        self.config
            .id_field
            .sibling("template_id")
            .set(&mut template, Value::String(code.to_string()));
        audit::stamp_template(&mut template, actor, Timestamp::now());
        let key = partition.template_key();
        self.write_fresh(&key, &to_bytes(&template)?)?;

        tracing::info!(partition = %partition, code = %code, actor = %actor, "created partition");
        Ok(partition)
    }

    // ── Create ──────────────────────────────────────────────────────────

    /// Create a record in the partition for `code` from its template.
    pub fn create(
        &self,
        code: &LocationCode,
        seed: &Value,
        actor: &Actor,
    ) -> Result<RecordId, RecordError> {
        let partition = self.partition(code)?;
        let template_key = partition.template_key();
        let template = self
            .load(&template_key)?
            .map(|(value, _)| value)
            .ok_or_else(|| RecordError::TemplateNotFound(partition.code.to_string()))?;
        self.create_from_template(&partition, &template, seed, actor)
    }

    /// Create a record in `partition` from an explicit template.
    ///
    /// `seed` is merged into a copy of `template`; `null` means no seed.
    /// Sequences whose identifier is already archived are skipped.
    pub fn create_from_template(
        &self,
        partition: &Partition,
        template: &Value,
        seed: &Value,
        actor: &Actor,
    ) -> Result<RecordId, RecordError> {
        if !(seed.is_object() || seed.is_null()) {
            return Err(RecordError::InvalidUpdate("seed must be a JSON object".into()));
        }
        reject_reserved(seed)?;

        let mut record = template.clone();
        if !seed.is_null() {
            merge_in_place(&mut record, seed);
        }
        if !record.is_object() {
            return Err(RecordError::InvalidUpdate(
                "template must be a JSON object".into(),
            ));
        }
        let status = audit::read_status(&record, &self.config.status_field)?;
        if status == RecordStatus::Deleted {
            return Err(RecordError::InvalidUpdate(
                "records cannot be created as Deleted".into(),
            ));
        }
        self.config
            .status_field
            .set(&mut record, Value::String(status.as_str().to_string()));

        let lock = self.partition_lock(&partition.code);
        let _guard = lock.lock();

        let mut sequence = self.locator.next_sequence(partition)?;
        let id = loop {
            let id = RecordId::new(partition.code.clone(), sequence)?;
            if !self.store.exists(&partition.archive_key(&id))? {
                break id;
            }
            tracing::debug!(record_id = %id, "sequence archived, skipping");
            sequence += 1;
        };

        self.config
            .id_field
            .set(&mut record, Value::String(id.to_string()));
        audit::stamp_created(&mut record, actor, Timestamp::now());
        self.write_fresh(&partition.record_key(&id), &to_bytes(&record)?)?;

        tracing::info!(
            record_id = %id,
            partition = %partition,
            actor = %actor,
            "created record"
        );
        Ok(id)
    }

    // ── Read ────────────────────────────────────────────────────────────

    /// The live record, or `None` when neither it nor its partition exists.
    pub fn read(&self, id: &RecordId) -> Result<Option<Value>, RecordError> {
        let Some(partition) = self.locator.resolve(id.code())? else {
            return Ok(None);
        };
        Ok(self.load(&partition.record_key(id))?.map(|(value, _)| value))
    }

    // ── Update ──────────────────────────────────────────────────────────

    /// Deep-merge `update` into the record, backing up the previous state.
    ///
    /// The status of the merged record is validated against the transition
    /// table and logged to `status_history`. Moving to `Deleted` is refused
    /// here; use [`soft_delete`](Self::soft_delete) or
    /// [`set_status`](Self::set_status). `system_info` and `status_history`
    /// are written by the engine only.
    pub fn apply_update(
        &self,
        id: &RecordId,
        update: &Value,
        actor: &Actor,
    ) -> Result<Value, RecordError> {
        if !update.is_object() {
            return Err(RecordError::InvalidUpdate(
                "update must be a JSON object".into(),
            ));
        }
        reject_reserved(update)?;
        let partition = self.record_partition(id)?;
        let lock = self.partition_lock(&partition.code);
        let _guard = lock.lock();

        let key = partition.record_key(id);
        let (current, raw) = self
            .load(&key)?
            .ok_or_else(|| RecordError::RecordNotFound(id.to_string()))?;

        let mut merged = current.clone();
        merge_in_place(&mut merged, update);
        let change = self.validate_update(id, &current, &merged)?;

        let counter = audit::backup_count(&current) + 1;
        self.write_fresh(&partition.backup_key(id, counter), &raw)?;

        let now = Timestamp::now();
        if let Some((from, to)) = change {
            self.config
                .status_field
                .set(&mut merged, Value::String(to.as_str().to_string()));
            if from != to {
                audit::push_status_change(&mut merged, from, to, actor, now);
            }
        }
        audit::stamp_updated(&mut merged, actor, now, counter);
        self.store.write(&key, &to_bytes(&merged)?)?;

        tracing::info!(
            record_id = %id,
            partition = %partition,
            actor = %actor,
            backup_count = counter,
            "updated record"
        );
        Ok(merged)
    }

    /// Checks run on the merged record before any write. Returns the status
    /// change, if the merge alters the stored status.
    fn validate_update(
        &self,
        id: &RecordId,
        current: &Value,
        merged: &Value,
    ) -> Result<Option<(RecordStatus, RecordStatus)>, RecordError> {
        let id_field = &self.config.id_field;
        let stored_id = id_field.get(current);
        let merged_id = id_field.get(merged);
        let restated = merged_id.and_then(Value::as_str) == Some(id.to_string().as_str());
        if merged_id != stored_id && !restated {
            return Err(RecordError::InvalidUpdate(format!("{id_field} cannot be changed")));
        }

        let current_status = audit::read_status(current, &self.config.status_field);
        if let Ok(RecordStatus::Deleted) = current_status {
            return Err(StatusError::Terminal(RecordStatus::Deleted).into());
        }

        let stored = self.config.status_field.get(current);
        let requested = self.config.status_field.get(merged);
        if requested == stored {
            return Ok(None);
        }
        let requested = match requested {
            None | Some(Value::Null) => {
                return Err(RecordError::InvalidUpdate(format!(
                    "{} cannot be removed",
                    self.config.status_field
                )))
            }
            Some(Value::String(s)) => s.parse::<RecordStatus>()?,
            Some(other) => return Err(ValidationError::UnknownStatus(other.to_string()).into()),
        };
        if requested == RecordStatus::Deleted {
            return Err(RecordError::InvalidUpdate(
                "status Deleted is set by soft delete only".into(),
            ));
        }
        let from = current_status?;
        from.transition(requested)?;
        Ok(Some((from, requested)))
    }

    /// Change the lifecycle status. `Deleted` performs a soft delete.
    pub fn set_status(
        &self,
        id: &RecordId,
        status: RecordStatus,
        actor: &Actor,
    ) -> Result<Value, RecordError> {
        if status == RecordStatus::Deleted {
            return self.soft_delete(id, actor);
        }
        let update = self
            .config
            .status_field
            .to_object(Value::String(status.as_str().to_string()));
        self.apply_update(id, &update, actor)
    }

    // ── Delete ──────────────────────────────────────────────────────────

    /// Move the record to `archive/<id>_deleted.json` with deletion metadata.
    ///
    /// Returns the archived record.
    pub fn soft_delete(&self, id: &RecordId, actor: &Actor) -> Result<Value, RecordError> {
        let partition = self.record_partition(id)?;
        let lock = self.partition_lock(&partition.code);
        let _guard = lock.lock();

        let key = partition.record_key(id);
        let (mut record, _) = self
            .load(&key)?
            .ok_or_else(|| RecordError::RecordNotFound(id.to_string()))?;
        let from = audit::read_status(&record, &self.config.status_field)?;
        from.transition(RecordStatus::Deleted)?;

        let now = Timestamp::now();
        audit::stamp_deleted(&mut record, actor, now);
        self.config.status_field.set(
            &mut record,
            Value::String(RecordStatus::Deleted.as_str().to_string()),
        );
        audit::push_status_change(&mut record, from, RecordStatus::Deleted, actor, now);

        self.write_fresh(&partition.archive_key(id), &to_bytes(&record)?)?;
        self.store.delete(&key)?;

        tracing::info!(
            record_id = %id,
            partition = %partition,
            actor = %actor,
            "soft-deleted record"
        );
        Ok(record)
    }

    // ── Backups ─────────────────────────────────────────────────────────

    /// Snapshots of `id`, counter-named first in counter order, then any
    /// other names in key order.
    pub fn backups(&self, id: &RecordId) -> Result<Vec<BackupSummary>, RecordError> {
        let partition = self.partition(id.code())?;
        let prefix = partition.backups_prefix(id);
        let mut backups: Vec<BackupSummary> = self
            .store
            .list(&prefix)?
            .into_iter()
            .filter_map(|key| {
                let suffix = layout::parse_backup_suffix(&key, &prefix)?;
                Some(match suffix {
                    BackupSuffix::Counter(n) => BackupSummary {
                        label: format!("{n:06}"),
                        counter: Some(n),
                        key,
                    },
                    BackupSuffix::Legacy(label) => BackupSummary {
                        counter: None,
                        label,
                        key,
                    },
                })
            })
            .collect();
        backups.sort_by(|a, b| match (a.counter, b.counter) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.key.cmp(&b.key),
        });
        Ok(backups)
    }

    /// Content of one snapshot of `id`.
    pub fn read_backup(&self, id: &RecordId, counter: u64) -> Result<Option<Value>, RecordError> {
        let partition = self.partition(id.code())?;
        Ok(self
            .load(&partition.backup_key(id, counter))?
            .map(|(value, _)| value))
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn record_partition(&self, id: &RecordId) -> Result<Partition, RecordError> {
        self.locator
            .resolve(id.code())?
            .ok_or_else(|| RecordError::RecordNotFound(id.to_string()))
    }

    /// Parsed object plus the exact stored bytes.
    pub(crate) fn load(&self, key: &str) -> Result<Option<(Value, Vec<u8>)>, RecordError> {
        let Some(bytes) = self.store.read(key)? else {
            return Ok(None);
        };
        let map: Map<String, Value> =
            serde_json::from_slice(&bytes).map_err(|source| RecordError::Malformed {
                key: key.to_string(),
                source,
            })?;
        Ok(Some((Value::Object(map), bytes)))
    }

    /// Write a key that must not exist yet.
    pub(crate) fn write_fresh(&self, key: &str, bytes: &[u8]) -> Result<(), RecordError> {
        if self.store.exists(key)? {
            return Err(RecordError::SequenceCollision {
                key: key.to_string(),
            });
        }
        self.store.write(key, bytes)?;
        Ok(())
    }
}

/// Refuse seeds and updates that write the engine-owned namespaces.
fn reject_reserved(payload: &Value) -> Result<(), RecordError> {
    let Some(map) = payload.as_object() else {
        return Ok(());
    };
    match [audit::SYSTEM_INFO, audit::STATUS_HISTORY]
        .into_iter()
        .find(|key| map.contains_key(*key))
    {
        Some(key) => Err(RecordError::InvalidUpdate(format!("{key} is maintained by the engine"))),
        None => Ok(()),
    }
}

pub(crate) fn to_bytes(record: &Value) -> Result<Vec<u8>, RecordError> {
    let mut bytes = serde_json::to_vec_pretty(record)?;
    bytes.push(b'\n');
    Ok(bytes)
}
