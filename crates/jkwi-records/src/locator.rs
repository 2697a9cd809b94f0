//! # Record Locator
//!
//! Maps location codes to partition folders and enumerates the live records
//! inside a partition. Stateless: every call rescans the store, so folders
//! added by other processes are picked up immediately.
//!
//! ## Resolution
//!
//! Partitions are visited in lexicographic key order (group, then folder)
//! and the first folder whose name starts with the requested code wins.
//! Overlapping codes are refused when partitions are created, so at most one
//! folder can match a code that came from that creation path.

use std::collections::BTreeSet;
use std::sync::Arc;

use jkwi_core::{LocationCode, RecordId};
use jkwi_store::{RecordStore, StoreError};
use serde::Serialize;

use crate::layout::Partition;

/// A live record found by [`RecordLocator::list_records`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    /// Parsed identifier.
    pub id: RecordId,
    /// Store key holding the record.
    pub key: String,
}

/// Partition lookup over a [`RecordStore`].
#[derive(Clone)]
pub struct RecordLocator {
    store: Arc<dyn RecordStore>,
}

impl std::fmt::Debug for RecordLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordLocator").finish_non_exhaustive()
    }
}

impl RecordLocator {
    /// Create a locator over `store`.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Every partition folder in the hierarchy, sorted.
    ///
    /// A folder exists when at least one key lives under `<group>/<folder>/`.
    /// Folders whose name does not start with a valid location code are
    /// ignored.
    pub fn partitions(&self) -> Result<Vec<Partition>, StoreError> {
        let mut folders = BTreeSet::new();
        for key in self.store.list("")? {
            let mut segments = key.splitn(3, '/');
            if let (Some(group), Some(folder), Some(_)) =
                (segments.next(), segments.next(), segments.next())
            {
                folders.insert((group.to_string(), folder.to_string()));
            }
        }
        let partitions: Vec<Partition> = folders
            .iter()
            .filter_map(|(group, folder)| {
                let partition = Partition::from_folder(group, folder);
                if partition.is_none() {
                    tracing::debug!(group, folder, "skipping folder without location code");
                }
                partition
            })
            .collect();
        tracing::debug!(count = partitions.len(), "scanned partitions");
        Ok(partitions)
    }

    /// The first partition whose folder name starts with `code`.
    pub fn resolve(&self, code: &LocationCode) -> Result<Option<Partition>, StoreError> {
        let found = self
            .partitions()?
            .into_iter()
            .find(|p| p.folder.starts_with(code.as_str()));
        match &found {
            Some(p) => tracing::debug!(code = %code, partition = %p, "resolved partition"),
            None => tracing::debug!(code = %code, "no partition for code"),
        }
        Ok(found)
    }

    /// Live records of `partition`, sorted by sequence.
    ///
    /// The template, the `backups/` and `archive/` areas, and any file whose
    /// name is not `<code>` + six digits + `.json` are skipped.
    pub fn list_records(&self, partition: &Partition) -> Result<Vec<RecordSummary>, StoreError> {
        let mut records: Vec<RecordSummary> = self
            .store
            .list(&partition.prefix())?
            .into_iter()
            .filter_map(|key| {
                partition
                    .parse_record_key(&key)
                    .map(|id| RecordSummary { id, key })
            })
            .collect();
        records.sort_by_key(|r| r.id.sequence());
        Ok(records)
    }

    /// `1 + max(existing sequence)`, or 1 for an empty partition.
    pub fn next_sequence(&self, partition: &Partition) -> Result<u32, StoreError> {
        let max = self
            .list_records(partition)?
            .iter()
            .map(|r| r.id.sequence())
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jkwi_store::MemoryStore;

    fn seeded(keys: &[&str]) -> RecordLocator {
        let store = MemoryStore::new();
        for key in keys {
            store.write(key, b"{}").unwrap();
        }
        RecordLocator::new(Arc::new(store))
    }

    fn code(s: &str) -> LocationCode {
        LocationCode::new(s).unwrap()
    }

    #[test]
    fn resolve_prefix_matches_folder() {
        let locator = seeded(&[
            "001-South-Africa/00100001-Nelson-Mandela/00100001.json",
            "001-South-Africa/00100002-Buffalo-City/00100002.json",
            "002-Botswana/00200001-Gaborone/00200001.json",
        ]);
        let p = locator.resolve(&code("00100002")).unwrap().unwrap();
        assert_eq!(p.group, "001-South-Africa");
        assert_eq!(p.name, "Buffalo-City");
        assert!(locator.resolve(&code("00900001")).unwrap().is_none());
    }

    #[test]
    fn partitions_ignores_top_level_files() {
        let locator = seeded(&[
            "readme.json",
            "g/EC101-Test/EC101.json",
            "g/loose.json",
        ]);
        let partitions = locator.partitions().unwrap();
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].code.as_str(), "EC101");
    }

    #[test]
    fn empty_partition_starts_at_one() {
        let locator = seeded(&["g/EC101-Test/EC101.json"]);
        let p = locator.resolve(&code("EC101")).unwrap().unwrap();
        assert!(locator.list_records(&p).unwrap().is_empty());
        assert_eq!(locator.next_sequence(&p).unwrap(), 1);
    }

    #[test]
    fn next_sequence_is_max_plus_one() {
        let locator = seeded(&[
            "g/EC101-Test/EC101.json",
            "g/EC101-Test/EC101000001.json",
            "g/EC101-Test/EC101000003.json",
        ]);
        let p = locator.resolve(&code("EC101")).unwrap().unwrap();
        assert_eq!(locator.next_sequence(&p).unwrap(), 4);
    }

    #[test]
    fn list_records_skips_noise() {
        let locator = seeded(&[
            "g/EC101-Test/EC101.json",
            "g/EC101-Test/EC101000002.json",
            "g/EC101-Test/EC101000001.json",
            "g/EC101-Test/EC101notes.json",
            "g/EC101-Test/EC10100001.json",
            "g/EC101-Test/export_EC101_20250101.json",
            "g/EC101-Test/backups/EC101000001_backup_000001.json",
            "g/EC101-Test/archive/EC101000009_deleted.json",
        ]);
        let p = locator.resolve(&code("EC101")).unwrap().unwrap();
        let ids: Vec<String> = locator
            .list_records(&p)
            .unwrap()
            .iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, vec!["EC101000001", "EC101000002"]);
        assert_eq!(locator.next_sequence(&p).unwrap(), 3);
    }
}
