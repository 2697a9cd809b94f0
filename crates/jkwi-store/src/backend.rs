//! # The `RecordStore` Trait
//!
//! Keys are relative, `/`-separated paths such as
//! `members/00100001-Nairobi/backups/00100001000001_backup_000001.json`.
//! Backends treat them as opaque beyond the separator; the record layout is
//! defined in `jkwi-records`.

use crate::error::StoreError;

/// Byte-level storage capability consumed by the record engine.
///
/// Implementations must be safe to share across threads. They are not
/// required to provide any cross-key atomicity; a single `write` must not
/// leave a torn value behind.
pub trait RecordStore: Send + Sync {
    /// Read the value at `key`. Absent keys are `Ok(None)`.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Create or replace the value at `key`.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Every key that starts with `prefix`, sorted lexicographically.
    ///
    /// The match is on the raw string: `"a/b"` matches `"a/b/c.json"` and
    /// `"a/bc.json"`. An empty prefix lists the whole store.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Remove `key`. Returns whether it existed.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Whether `key` currently holds a value.
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.read(key)?.is_some())
    }
}

/// Reject keys that could escape the store root or alias another key.
///
/// A valid key is non-empty, relative, uses `/` as its only separator, and
/// has no empty, `.`-prefixed or `..` segments.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let invalid = || StoreError::InvalidKey(key.to_string());
    if key.is_empty() || key.starts_with('/') || key.contains('\\') || key.contains('\0') {
        return Err(invalid());
    }
    for segment in key.split('/') {
        if segment.is_empty() || segment.starts_with('.') {
            return Err(invalid());
        }
    }
    Ok(())
}

/// Prefixes follow the key rules but may be empty or end in `/`.
pub(crate) fn validate_prefix(prefix: &str) -> Result<(), StoreError> {
    match prefix.strip_suffix('/') {
        _ if prefix.is_empty() => Ok(()),
        Some(dir) => validate_key(dir).map_err(|_| StoreError::InvalidKey(prefix.to_string())),
        None => validate_key(prefix),
    }
}
