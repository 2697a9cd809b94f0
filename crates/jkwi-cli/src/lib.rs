//! # jkwi-cli: CLI Tool for JKWI Records
//!
//! Provides the `jkwi` command-line interface. Every subcommand opens a
//! [`RecordEngine`] over a [`LocalFsStore`] rooted at the data directory
//! and prints its result as pretty JSON on stdout.
//!
//! ## Subcommands
//!
//! - `jkwi partition create|list|stats`: partition provisioning and counts.
//! - `jkwi record create|get|update|delete|status|backups|list`: record lifecycle.
//! - `jkwi search`: field-path search across partitions.
//! - `jkwi export` / `jkwi import`: partition bundles.
//!
//! JSON arguments are accepted inline or as `@path/to/file.json`:
//!
//! ```bash
//! jkwi partition create --group EC --code EC101 --name Quito
//! jkwi record create EC101 '{"member_info": {"full_name": "Ana"}}'
//! jkwi record update EC101000001 @changes.json
//! jkwi record status EC101000001 active
//! ```

pub mod config;
pub mod partition;
pub mod record;
pub mod search;
pub mod transfer;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use jkwi_core::Actor;
use jkwi_records::RecordEngine;
use jkwi_store::LocalFsStore;
use serde::Serialize;
use serde_json::Value;

use crate::config::CliConfig;

/// Engine plus the actor recorded on every mutation.
#[derive(Debug)]
pub struct Session {
    pub engine: RecordEngine,
    pub actor: Actor,
}

impl Session {
    /// Open the filesystem store at `config.data_dir`.
    pub fn open(config: &CliConfig, actor: Actor) -> Self {
        let store = Arc::new(LocalFsStore::new(&config.data_dir));
        tracing::debug!(data_dir = %config.data_dir.display(), actor = %actor, "opening data directory");
        Self {
            engine: RecordEngine::with_config(store, config.engine.clone()),
            actor,
        }
    }
}

/// Parse a JSON argument given inline or as `@file`.
pub fn parse_json_arg(arg: &str) -> Result<Value> {
    match arg.strip_prefix('@') {
        Some(path) => {
            let content = std::fs::read_to_string(Path::new(path))
                .with_context(|| format!("failed to read {path}"))?;
            serde_json::from_str(&content).with_context(|| format!("{path} is not valid JSON"))
        }
        None => serde_json::from_str(arg).context("argument is not valid JSON"),
    }
}

/// Print `value` as pretty JSON on stdout.
pub fn emit<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_arg_inline() {
        let value = parse_json_arg(r#"{"a": {"b": 1}}"#).unwrap();
        assert_eq!(value, json!({"a": {"b": 1}}));
    }

    #[test]
    fn json_arg_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, r#"{"notes": "from file"}"#).unwrap();
        let value = parse_json_arg(&format!("@{}", path.display())).unwrap();
        assert_eq!(value["notes"], "from file");
    }

    #[test]
    fn json_arg_errors_are_descriptive() {
        let err = parse_json_arg("{nope").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
        let err = parse_json_arg("@/definitely/missing.json").unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
