//! # Persisted Key Layout
//!
//! ```text
//! <group>/<code>-<name>/                          partition folder
//! <group>/<code>-<name>/<code>.json               template
//! <group>/<code>-<name>/<code><seq:06>.json       live record
//! <group>/<code>-<name>/backups/<id>_backup_<n:06>.json
//! <group>/<code>-<name>/archive/<id>_deleted.json
//! ```
//!
//! Every key the engine reads or writes is built here. Files written by
//! earlier tooling are only ever parsed, never renamed.

use std::fmt;

use jkwi_core::{LocationCode, RecordId, SEQUENCE_WIDTH};
use serde::Serialize;

/// Name of the per-partition backup area.
pub const BACKUPS_DIR: &str = "backups";
/// Name of the per-partition archive area.
pub const ARCHIVE_DIR: &str = "archive";

const BACKUP_INFIX: &str = "_backup_";
const ARCHIVE_SUFFIX: &str = "_deleted.json";
const JSON_EXT: &str = ".json";

/// A partition folder in the two-level hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Partition {
    /// First-level folder, e.g. `001-South-Africa`.
    pub group: String,
    /// Second-level folder, `<code>-<name>`.
    pub folder: String,
    /// Location code parsed from the folder name.
    pub code: LocationCode,
    /// Human-readable name parsed from the folder name.
    pub name: String,
}

impl Partition {
    /// Interpret a folder name. The code is everything before the first `-`.
    ///
    /// Returns `None` when that prefix is not a valid location code.
    pub fn from_folder(group: &str, folder: &str) -> Option<Self> {
        let (code, name) = match folder.split_once('-') {
            Some((code, name)) => (code, name),
            None => (folder, folder),
        };
        let code = LocationCode::new(code).ok()?;
        Some(Self {
            group: group.to_string(),
            folder: folder.to_string(),
            code,
            name: name.to_string(),
        })
    }

    /// Build the folder for a new partition.
    pub fn new(group: &str, code: LocationCode, name: &str) -> Self {
        Self {
            group: group.to_string(),
            folder: format!("{code}-{name}"),
            code,
            name: name.to_string(),
        }
    }

    /// `<group>/<folder>/`
    pub fn prefix(&self) -> String {
        format!("{}/{}/", self.group, self.folder)
    }

    /// Key of the partition template.
    pub fn template_key(&self) -> String {
        format!("{}{}{JSON_EXT}", self.prefix(), self.code)
    }

    /// Key of a live record.
    pub fn record_key(&self, id: &RecordId) -> String {
        format!("{}{id}{JSON_EXT}", self.prefix())
    }

    /// Prefix shared by every backup of `id`.
    pub fn backups_prefix(&self, id: &RecordId) -> String {
        format!("{}{BACKUPS_DIR}/{id}{BACKUP_INFIX}", self.prefix())
    }

    /// Key of backup number `counter` of `id`.
    pub fn backup_key(&self, id: &RecordId, counter: u64) -> String {
        format!(
            "{}{counter:0width$}{JSON_EXT}",
            self.backups_prefix(id),
            width = SEQUENCE_WIDTH
        )
    }

    /// Key of the archived copy of `id`.
    pub fn archive_key(&self, id: &RecordId) -> String {
        format!("{}{ARCHIVE_DIR}/{id}{ARCHIVE_SUFFIX}", self.prefix())
    }

    /// If `key` is a live record of this partition, its sequence number.
    ///
    /// The file must sit directly in the folder and be named
    /// `<code>` + exactly six digits + `.json`. The template, nested areas
    /// and any other suffix return `None`.
    pub fn parse_record_key(&self, key: &str) -> Option<RecordId> {
        let file = key.strip_prefix(&self.prefix())?;
        if file.contains('/') {
            return None;
        }
        let digits = file
            .strip_suffix(JSON_EXT)?
            .strip_prefix(self.code.as_str())?;
        if digits.len() != SEQUENCE_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let sequence = digits.parse().ok()?;
        RecordId::new(self.code.clone(), sequence).ok()
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.folder)
    }
}

/// How a backup file is numbered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupSuffix {
    /// Six-digit backup counter.
    Counter(u64),
    /// Anything else, such as a `YYYYMMDD_HHMMSS` timestamp from older tooling.
    Legacy(String),
}

/// Split a backup key into its suffix, given the prefix for its record.
pub fn parse_backup_suffix(key: &str, backups_prefix: &str) -> Option<BackupSuffix> {
    let suffix = key.strip_prefix(backups_prefix)?.strip_suffix(JSON_EXT)?;
    if suffix.is_empty() || suffix.contains('/') {
        return None;
    }
    let is_counter = suffix.len() == SEQUENCE_WIDTH && suffix.bytes().all(|b| b.is_ascii_digit());
    match suffix.parse() {
        Ok(n) if is_counter => Some(BackupSuffix::Counter(n)),
        _ => Some(BackupSuffix::Legacy(suffix.to_string())),
    }
}

/// Whether `segment` can be used as a group or partition name.
pub fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.starts_with('.')
        && !segment.contains(['/', '\\', '\0'])
        && !segment.chars().any(char::is_control)
}
