//! # Export and Import
//!
//! An [`ExportBundle`] is a self-contained JSON document holding every live
//! record of one partition. Importing a bundle writes each record back into
//! the partition whose code is exactly its identifier's code, which need not
//! be the bundle's own partition. Archived identifiers stay archived.

use jkwi_core::{Actor, LocationCode, RecordId, RecordStatus, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audit;
use crate::engine::{to_bytes, RecordEngine};
use crate::error::RecordError;
use crate::layout::Partition;

/// Snapshot of one partition's live records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    /// Code of the exported partition.
    pub partition_code: LocationCode,
    /// When the export was taken.
    pub export_date: String,
    /// Full record contents.
    #[serde(default)]
    pub records: Vec<Value>,
}

/// Outcome of [`RecordEngine::import`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Records written under a previously unused key.
    pub created: usize,
    /// Records that replaced a live record (after backing it up).
    pub overwritten: usize,
    /// Records without a valid identifier, without a matching partition,
    /// already archived, or carrying a status that cannot be live.
    pub skipped: usize,
}

impl RecordEngine {
    /// Export the partition for `code`.
    pub fn export(&self, code: &LocationCode) -> Result<ExportBundle, RecordError> {
        let partition = self.partition(code)?;
        self.export_partition(&partition)
    }

    /// Export every partition.
    pub fn export_all(&self) -> Result<Vec<ExportBundle>, RecordError> {
        self.locator
            .partitions()?
            .iter()
            .map(|p| self.export_partition(p))
            .collect()
    }

    fn export_partition(&self, partition: &Partition) -> Result<ExportBundle, RecordError> {
        let records = self.load_partition(partition)?;
        tracing::info!(partition = %partition, records = records.len(), "exported partition");
        Ok(ExportBundle {
            partition_code: partition.code.clone(),
            export_date: Timestamp::now().to_iso8601(),
            records,
        })
    }

    /// Write every record of `bundle` into the partition its id belongs to.
    ///
    /// A live record being replaced is backed up first, and the incoming
    /// record's `backup_count` continues from the replaced one.
    pub fn import(&self, bundle: &ExportBundle, actor: &Actor) -> Result<ImportReport, RecordError> {
        let mut report = ImportReport::default();
        for record in &bundle.records {
            let Some(id) = self.import_target(record) else {
                report.skipped += 1;
                continue;
            };
            let partition = match self.locator.resolve(id.code())? {
                Some(partition) if partition.code == *id.code() => partition,
                _ => {
                    tracing::warn!(record_id = %id, "skipping import: no partition for record");
                    report.skipped += 1;
                    continue;
                }
            };
            match audit::read_status(record, &self.config.status_field) {
                Ok(status) if status != RecordStatus::Deleted => {}
                _ => {
                    tracing::warn!(record_id = %id, "skipping import: status cannot be live");
                    report.skipped += 1;
                    continue;
                }
            }

            let lock = self.partition_lock(&partition.code);
            let _guard = lock.lock();
            if self.store.exists(&partition.archive_key(&id))? {
                tracing::warn!(record_id = %id, "skipping import: record is archived");
                report.skipped += 1;
                continue;
            }
            let key = partition.record_key(&id);
            let mut incoming = record.clone();
            match self.load(&key) {
                Ok(Some((existing, raw))) => {
                    let counter = audit::backup_count(&existing) + 1;
                    self.write_fresh(&partition.backup_key(&id, counter), &raw)?;
                    audit::stamp_updated(&mut incoming, actor, Timestamp::now(), counter);
                    report.overwritten += 1;
                }
                // Corrupt live file: replaced without a backup of unparseable bytes.
                Err(RecordError::Malformed { .. }) => {
                    tracing::warn!(key = %key, "replacing malformed record on import");
                    report.overwritten += 1;
                }
                Ok(None) => report.created += 1,
                Err(e) => return Err(e),
            }
            self.store.write(&key, &to_bytes(&incoming)?)?;
        }
        tracing::info!(
            partition_code = %bundle.partition_code,
            actor = %actor,
            created = report.created,
            overwritten = report.overwritten,
            skipped = report.skipped,
            "imported bundle"
        );
        Ok(report)
    }

    fn import_target(&self, record: &Value) -> Option<RecordId> {
        if !record.is_object() {
            tracing::warn!("skipping import: record is not an object");
            return None;
        }
        let raw = self.config.id_field.get_str(record)?;
        match RecordId::parse(raw) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "skipping import: invalid record id");
                None
            }
        }
    }
}

impl ExportBundle {
    /// An empty bundle for `code`, dated now.
    pub fn empty(code: LocationCode) -> Self {
        Self {
            partition_code: code,
            export_date: Timestamp::now().to_iso8601(),
            records: Vec::new(),
        }
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jkwi_store::{MemoryStore, RecordStore};
    use serde_json::json;
    use std::sync::Arc;

    fn engine() -> (RecordEngine, LocationCode, MemoryStore) {
        let store = MemoryStore::new();
        let engine = RecordEngine::new(Arc::new(store.clone()));
        let code = LocationCode::new("EC101").unwrap();
        engine
            .create_partition("EC", &code, "Test", None, &Actor::system())
            .unwrap();
        (engine, code, store)
    }

    #[test]
    fn export_then_import_into_fresh_store() {
        let (source, code, _) = engine();
        for name in ["A", "B"] {
            source
                .create(&code, &json!({"member_info": {"full_name": name}}), &Actor::system())
                .unwrap();
        }
        let bundle = source.export(&code).unwrap();
        assert_eq!(bundle.records.len(), 2);
        assert_eq!(bundle.partition_code, code);

        let (target, _, _) = engine();
        let report = target.import(&bundle, &Actor::system()).unwrap();
        assert_eq!(report, ImportReport { created: 2, overwritten: 0, skipped: 0 });
        assert_eq!(target.list(&code).unwrap(), bundle.records);
    }

    #[test]
    fn import_backs_up_overwritten_records() {
        let (engine, code, store) = engine();
        let id = engine.create(&code, &json!({"notes": "live"}), &Actor::system()).unwrap();
        engine.apply_update(&id, &json!({"notes": "live2"}), &Actor::system()).unwrap();

        let mut incoming = engine.read(&id).unwrap().unwrap();
        incoming["notes"] = json!("imported");
        let mut bundle = ExportBundle::empty(code.clone());
        bundle.records.push(incoming);

        let report = engine.import(&bundle, &Actor::new("migrator").unwrap()).unwrap();
        assert_eq!(report.overwritten, 1);

        let record = engine.read(&id).unwrap().unwrap();
        assert_eq!(record["notes"], "imported");
        assert_eq!(record["system_info"]["backup_count"], 2);
        assert_eq!(record["system_info"]["updated_by"], "migrator");

        let partition = engine.partition(&code).unwrap();
        let backup: Value =
            serde_json::from_slice(&store.read(&partition.backup_key(&id, 2)).unwrap().unwrap())
                .unwrap();
        assert_eq!(backup["notes"], "live2");
    }

    #[test]
    fn import_skips_unplaceable_records() {
        let (engine, code, _) = engine();
        let mut bundle = ExportBundle::empty(code);
        bundle.records.push(json!({"member_info": {"member_id": ""}}));
        bundle.records.push(json!({"notes": "no id"}));
        bundle.records.push(json!({"member_info": {"member_id": "ZZ9000001"}}));
        bundle.records.push(json!("not an object"));
        let report = engine.import(&bundle, &Actor::system()).unwrap();
        assert_eq!(report.skipped, 4);
        assert_eq!(report.created, 0);
    }

    #[test]
    fn import_requires_exact_partition_code() {
        let (engine, code, store) = engine();
        let keys_before = store.list("").unwrap();
        let mut bundle = ExportBundle::empty(code.clone());
        // Code EC10 prefix-matches the EC101 partition but is not its code.
        bundle.records.push(json!({"member_info": {"member_id": "EC10000001"}}));
        let report = engine.import(&bundle, &Actor::system()).unwrap();
        assert_eq!(report, ImportReport { created: 0, overwritten: 0, skipped: 1 });
        assert!(engine.read(&RecordId::parse("EC10000001").unwrap()).unwrap().is_none());
        assert_eq!(store.list("").unwrap(), keys_before);
    }

    #[test]
    fn import_never_revives_archived_records() {
        let (engine, code, _) = engine();
        let id = engine.create(&code, &Value::Null, &Actor::system()).unwrap();
        let live = engine.read(&id).unwrap().unwrap();
        let archived = engine.soft_delete(&id, &Actor::system()).unwrap();

        let mut bundle = ExportBundle::empty(code.clone());
        bundle.records.push(live);
        bundle.records.push(archived);
        let report = engine.import(&bundle, &Actor::system()).unwrap();
        assert_eq!(report.skipped, 2);
        assert_eq!(report.created, 0);
        assert!(engine.read(&id).unwrap().is_none());
        assert!(engine.list(&code).unwrap().is_empty());
    }

    #[test]
    fn import_skips_deleted_and_unknown_statuses() {
        let (engine, code, _) = engine();
        let mut bundle = ExportBundle::empty(code.clone());
        bundle.records.push(json!({
            "member_info": {"member_id": "EC101000005"},
            "jkwi_info": {"status": "Deleted"}
        }));
        bundle.records.push(json!({
            "member_info": {"member_id": "EC101000006"},
            "jkwi_info": {"status": "Suspended"}
        }));
        bundle.records.push(json!({
            "member_info": {"member_id": "EC101000007"},
            "jkwi_info": {"status": "Active"}
        }));
        let report = engine.import(&bundle, &Actor::system()).unwrap();
        assert_eq!(report, ImportReport { created: 1, overwritten: 0, skipped: 2 });
        let listed: Vec<_> = engine
            .list(&code)
            .unwrap()
            .iter()
            .map(|r| r["member_info"]["member_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(listed, vec!["EC101000007"]);
    }

    #[test]
    fn export_all_covers_every_partition() {
        let (engine, _, _) = engine();
        engine
            .create_partition("EC", &LocationCode::new("EC102").unwrap(), "Other", None, &Actor::system())
            .unwrap();
        let bundles = engine.export_all().unwrap();
        let codes: Vec<_> = bundles.iter().map(|b| b.partition_code.to_string()).collect();
        assert_eq!(codes, vec!["EC101", "EC102"]);
    }

    #[test]
    fn bundle_json_shape() {
        let bundle = ExportBundle::empty(LocationCode::new("EC101").unwrap());
        let value: Value = serde_json::from_str(&bundle.to_json().unwrap()).unwrap();
        assert_eq!(value["partition_code"], "EC101");
        assert!(value["records"].as_array().unwrap().is_empty());
        assert!(value["export_date"].as_str().unwrap().ends_with('Z'));
    }
}
