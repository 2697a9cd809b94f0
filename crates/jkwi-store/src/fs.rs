//! # Local Filesystem Backend
//!
//! One file per key under a root directory. `a/b/c.json` lives at
//! `<root>/a/b/c.json`; intermediate directories are created on write.
//!
//! Writes go to a hidden temporary sibling (`.c.json.<n>.tmp`) and are then
//! renamed over the target, so a reader sees either the old or the new bytes,
//! never a partial file. Hidden entries are skipped when listing.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::backend::{validate_key, validate_prefix, RecordStore};
use crate::error::StoreError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// [`RecordStore`] over a directory tree.
#[derive(Debug, Clone)]
pub struct LocalFsStore {
    root: PathBuf,
}

impl LocalFsStore {
    /// Open a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |p, seg| p.join(seg)))
    }

    fn walk(&self, dir: &Path, rel: &str, out: &mut Vec<String>) -> Result<(), StoreError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StoreError::io(rel, e)),
        };
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(rel, e))?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                tracing::debug!(dir = %dir.display(), "skipping non-UTF-8 file name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let key = if rel.is_empty() {
                name
            } else {
                format!("{rel}/{name}")
            };
            let file_type = entry.file_type().map_err(|e| StoreError::io(&key, e))?;
            if file_type.is_dir() {
                self.walk(&entry.path(), &key, out)?;
            } else if file_type.is_file() {
                out.push(key);
            }
        }
        Ok(())
    }
}

impl RecordStore for LocalFsStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(key, e)),
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let (Some(dir), Some(file_name)) = (path.parent(), path.file_name()) else {
            return Err(StoreError::InvalidKey(key.to_string()));
        };
        fs::create_dir_all(dir).map_err(|e| StoreError::io(key, e))?;

        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp = dir.join(format!(
            ".{}.{}.{n}.tmp",
            file_name.to_string_lossy(),
            std::process::id()
        ));
        let result = fs::File::create(&tmp)
            .and_then(|mut f| {
                f.write_all(bytes)?;
                f.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &path));
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(key, e));
        }
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        validate_prefix(prefix)?;
        // Walk from the deepest directory the prefix fully names.
        let base = match prefix.rfind('/') {
            Some(i) => &prefix[..i],
            None => "",
        };
        let dir = if base.is_empty() {
            self.root.clone()
        } else {
            self.path_for(base)?
        };
        let mut keys = Vec::new();
        self.walk(&dir, base, &mut keys)?;
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(key, e)),
        }
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.path_for(key)?.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_intermediate_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsStore::new(dir.path());
        store.write("a/b/c.json", b"{}").unwrap();
        assert!(dir.path().join("a").join("b").join("c.json").is_file());
    }

    #[test]
    fn write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsStore::new(dir.path());
        store.write("x/one.json", b"1").unwrap();
        store.write("x/one.json", b"2").unwrap();
        let names: Vec<_> = fs::read_dir(dir.path().join("x"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["one.json".to_string()]);
        assert_eq!(store.read("x/one.json").unwrap().unwrap(), b"2");
    }

    #[test]
    fn list_skips_hidden_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsStore::new(dir.path());
        store.write("p/a.json", b"1").unwrap();
        fs::write(dir.path().join("p").join(".a.json.1.0.tmp"), b"partial").unwrap();
        assert_eq!(store.list("p/").unwrap(), vec!["p/a.json"]);
    }

    #[test]
    fn path_for_rejects_traversal() {
        let store = LocalFsStore::new("/tmp/never-used");
        assert!(matches!(
            store.read("../outside.json"),
            Err(StoreError::InvalidKey(_))
        ));
    }
}
