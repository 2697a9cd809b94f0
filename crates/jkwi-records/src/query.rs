//! # Queries
//!
//! Read-only scans over live records: full listing, field search and
//! partition statistics. A record that fails to parse is logged and skipped
//! so one corrupt file never hides the rest of a partition.

use std::collections::BTreeMap;

use jkwi_core::{LocationCode, RecordStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::audit;
use crate::engine::RecordEngine;
use crate::error::RecordError;
use crate::field::FieldPath;
use crate::layout::Partition;

/// Conjunction of field criteria, deserialized from a JSON object such as
/// `{"jkwi_info.status": "Active", "member_info.full_name": "smith"}`.
///
/// String criteria match string fields by case-insensitive substring. Every
/// other criterion matches by equality. A record lacking a queried field
/// does not match.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct SearchQuery {
    criteria: Vec<(FieldPath, Value)>,
}

impl SearchQuery {
    /// Whether `record` satisfies every criterion.
    pub fn matches(&self, record: &Value) -> bool {
        self.criteria.iter().all(|(path, expected)| {
            match (path.get(record), expected) {
                (None, _) => false,
                (Some(Value::String(actual)), Value::String(wanted)) => {
                    actual.to_lowercase().contains(&wanted.to_lowercase())
                }
                (Some(actual), expected) => actual == expected,
            }
        })
    }

    /// Whether the query has no criteria (matches everything).
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for SearchQuery {
    type Error = RecordError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let criteria = map
            .into_iter()
            .map(|(key, value)| Ok((FieldPath::parse(&key)?, value)))
            .collect::<Result<_, RecordError>>()?;
        Ok(Self { criteria })
    }
}

/// Counts for one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionStats {
    /// Partition code.
    pub partition_code: LocationCode,
    /// Partition name.
    pub partition_name: String,
    /// Live records.
    pub total: usize,
    /// Records with status `Active`.
    pub active: usize,
    /// Records with status `Pending`, including those without a status.
    pub pending: usize,
    /// Everything else.
    pub inactive: usize,
    /// Records per division; blank or missing is `Unassigned`.
    pub divisions: BTreeMap<String, usize>,
}

const UNASSIGNED: &str = "Unassigned";

impl RecordEngine {
    /// Full content of every live record in the partition for `code`.
    pub fn list(&self, code: &LocationCode) -> Result<Vec<Value>, RecordError> {
        let partition = self.partition(code)?;
        self.load_partition(&partition)
    }

    /// Live records in every partition matching `query`.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<Value>, RecordError> {
        let mut results = Vec::new();
        for partition in self.locator.partitions()? {
            results.extend(
                self.load_partition(&partition)?
                    .into_iter()
                    .filter(|record| query.matches(record)),
            );
        }
        tracing::debug!(matches = results.len(), "search complete");
        Ok(results)
    }

    /// Status and division counts for the partition for `code`.
    pub fn stats(&self, code: &LocationCode) -> Result<PartitionStats, RecordError> {
        let partition = self.partition(code)?;
        let records = self.load_partition(&partition)?;
        let mut stats = PartitionStats {
            partition_code: partition.code.clone(),
            partition_name: partition.name.clone(),
            total: records.len(),
            active: 0,
            pending: 0,
            inactive: 0,
            divisions: BTreeMap::new(),
        };
        for record in &records {
            match audit::read_status(record, &self.config.status_field) {
                Ok(RecordStatus::Active) => stats.active += 1,
                Ok(RecordStatus::Pending) => stats.pending += 1,
                _ => stats.inactive += 1,
            }
            let division = match self.config.division_field.get(record) {
                Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
                None | Some(Value::Null) | Some(Value::String(_)) => UNASSIGNED.to_string(),
                Some(other) => other.to_string(),
            };
            *stats.divisions.entry(division).or_default() += 1;
        }
        Ok(stats)
    }

    /// Parse every live record of `partition`, skipping malformed ones.
    pub(crate) fn load_partition(&self, partition: &Partition) -> Result<Vec<Value>, RecordError> {
        let mut records = Vec::new();
        for summary in self.locator.list_records(partition)? {
            match self.load(&summary.key) {
                Ok(Some((record, _))) => records.push(record),
                // Deleted between listing and reading.
                Ok(None) => {}
                Err(RecordError::Malformed { key, source }) => {
                    tracing::warn!(key = %key, error = %source, "skipping malformed record");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }
}
