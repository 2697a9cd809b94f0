//! # Export / Import Subcommands
//!
//! - `jkwi export <code> [--output FILE]`: one partition's bundle.
//! - `jkwi export --all [--output FILE]`: every partition, as an array of bundles.
//! - `jkwi import FILE`: a bundle or an array of bundles.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use jkwi_core::LocationCode;
use jkwi_records::{ExportBundle, ImportReport};
use serde_json::Value;

use crate::{emit, Session};

/// Arguments for the `jkwi export` subcommand.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Location code of the partition to export.
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub code: Option<String>,
    /// Export every partition.
    #[arg(long)]
    pub all: bool,
    /// Write to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `jkwi import` subcommand.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Bundle file produced by `jkwi export`.
    pub file: PathBuf,
}

/// Execute the export subcommand.
pub fn run_export(args: &ExportArgs, session: &Session) -> Result<u8> {
    let output = cmd_export(session, args.code.as_deref(), args.all)?;
    match &args.output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&output)?;
            std::fs::write(path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("OK: wrote {}", path.display());
        }
        None => emit(&output)?,
    }
    Ok(0)
}

/// Execute the import subcommand.
pub fn run_import(args: &ImportArgs, session: &Session) -> Result<u8> {
    emit(&cmd_import(session, &args.file)?)?;
    Ok(0)
}

pub(crate) fn cmd_export(session: &Session, code: Option<&str>, all: bool) -> Result<Value> {
    if all {
        return Ok(serde_json::to_value(session.engine.export_all()?)?);
    }
    let Some(code) = code else {
        bail!("a location code or --all is required");
    };
    let code = LocationCode::new(code).context("invalid location code")?;
    Ok(serde_json::to_value(session.engine.export(&code)?)?)
}

/// Import a single bundle or an array of bundles; reports are summed.
pub(crate) fn cmd_import(session: &Session, file: &Path) -> Result<ImportReport> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    let parsed = if value.is_array() {
        serde_json::from_value::<Vec<ExportBundle>>(value)
    } else {
        serde_json::from_value::<ExportBundle>(value).map(|bundle| vec![bundle])
    };
    let bundles = parsed.context("not an export bundle")?;

    let mut total = ImportReport::default();
    for bundle in &bundles {
        let report = session.engine.import(bundle, &session.actor)?;
        total.created += report.created;
        total.overwritten += report.overwritten;
        total.skipped += report.skipped;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use crate::{partition, record};
    use jkwi_core::Actor;

    fn session(dir: &Path) -> Session {
        let config = CliConfig::load(None, Some(dir.to_path_buf())).unwrap();
        let session = Session::open(&config, Actor::system());
        partition::cmd_create(&session, "EC", "EC101", "Quito", None).unwrap();
        session
    }

    #[test]
    fn export_then_import_round_trip() {
        let source_dir = tempfile::tempdir().unwrap();
        let source = session(source_dir.path());
        record::cmd_create(&source, "EC101", Some(r#"{"member_info": {"full_name": "A"}}"#)).unwrap();

        let bundle = cmd_export(&source, Some("EC101"), false).unwrap();
        assert_eq!(bundle["partition_code"], "EC101");
        let file = source_dir.path().join("bundle.json");
        std::fs::write(&file, serde_json::to_string(&bundle).unwrap()).unwrap();

        let target_dir = tempfile::tempdir().unwrap();
        let target = session(target_dir.path());
        let report = cmd_import(&target, &file).unwrap();
        assert_eq!(report.created, 1);

        let report = cmd_import(&target, &file).unwrap();
        assert_eq!(report.overwritten, 1);
        assert!(target_dir
            .path()
            .join("EC/EC101-Quito/backups/EC101000001_backup_000001.json")
            .is_file());
    }

    #[test]
    fn export_all_is_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        let all = cmd_export(&session, None, true).unwrap();
        assert_eq!(all.as_array().unwrap().len(), 1);
    }

    #[test]
    fn import_rejects_non_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        let file = dir.path().join("junk.json");
        std::fs::write(&file, r#"{"hello": "world"}"#).unwrap();
        let err = cmd_import(&session, &file).unwrap_err();
        assert!(err.to_string().contains("not an export bundle"));
    }
}
