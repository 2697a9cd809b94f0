//! # Partition Subcommand
//!
//! - `create`: provision `<group>/<code>-<name>/` with a template.
//! - `list`: every partition in the data directory.
//! - `stats`: status and division counts for one partition.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use jkwi_core::LocationCode;
use jkwi_records::{Partition, PartitionStats};

use crate::{emit, parse_json_arg, Session};

/// Arguments for the `jkwi partition` subcommand.
#[derive(Args, Debug)]
pub struct PartitionArgs {
    #[command(subcommand)]
    pub command: PartitionCommand,
}

/// Partition subcommands.
#[derive(Subcommand, Debug)]
pub enum PartitionCommand {
    /// Provision a new partition.
    Create {
        /// Top-level grouping folder (e.g. "EC").
        #[arg(long)]
        group: String,
        /// Location code (e.g. "EC101"). Must not overlap an existing code.
        #[arg(long)]
        code: String,
        /// Partition name, appended to the folder as `<code>-<name>`.
        #[arg(long)]
        name: String,
        /// Template record, inline JSON or @file. Defaults to the member template.
        #[arg(long)]
        template: Option<String>,
    },

    /// List partitions.
    List,

    /// Show record counts by status and division.
    Stats {
        /// Location code.
        code: String,
    },
}

/// Execute the partition subcommand.
pub fn run_partition(args: &PartitionArgs, session: &Session) -> Result<u8> {
    match &args.command {
        PartitionCommand::Create {
            group,
            code,
            name,
            template,
        } => emit(&cmd_create(session, group, code, name, template.as_deref())?)?,
        PartitionCommand::List => emit(&cmd_list(session)?)?,
        PartitionCommand::Stats { code } => emit(&cmd_stats(session, code)?)?,
    }
    Ok(0)
}

pub(crate) fn cmd_create(
    session: &Session,
    group: &str,
    code: &str,
    name: &str,
    template: Option<&str>,
) -> Result<Partition> {
    let code = LocationCode::new(code).context("invalid location code")?;
    let template = template.map(parse_json_arg).transpose()?;
    let partition = session
        .engine
        .create_partition(group, &code, name, template, &session.actor)?;
    Ok(partition)
}

pub(crate) fn cmd_list(session: &Session) -> Result<Vec<Partition>> {
    Ok(session.engine.partitions()?)
}

pub(crate) fn cmd_stats(session: &Session, code: &str) -> Result<PartitionStats> {
    let code = LocationCode::new(code).context("invalid location code")?;
    Ok(session.engine.stats(&code)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use jkwi_core::Actor;

    fn session(dir: &std::path::Path) -> Session {
        let config = CliConfig::load(None, Some(dir.to_path_buf())).unwrap();
        Session::open(&config, Actor::new("tester").unwrap())
    }

    #[test]
    fn create_list_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());

        let partition = cmd_create(&session, "EC", "EC101", "Quito", None).unwrap();
        assert_eq!(partition.folder, "EC101-Quito");
        assert!(dir.path().join("EC/EC101-Quito/EC101.json").is_file());

        let partitions = cmd_list(&session).unwrap();
        assert_eq!(partitions, vec![partition]);

        let stats = cmd_stats(&session, "EC101").unwrap();
        assert_eq!(stats.total, 0);
    }

    #[test]
    fn custom_template_from_inline_json() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        cmd_create(
            &session,
            "companies",
            "C1",
            "Holdings",
            Some(r#"{"member_info": {"member_id": ""}, "company": {"sector": "mining"}}"#),
        )
        .unwrap();
        let raw = std::fs::read_to_string(dir.path().join("companies/C1-Holdings/C1.json")).unwrap();
        assert!(raw.contains("\"sector\": \"mining\""));
    }

    #[test]
    fn overlapping_code_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path());
        cmd_create(&session, "EC", "EC101", "Quito", None).unwrap();
        let err = cmd_create(&session, "EC", "EC10", "Other", None).unwrap_err();
        assert!(err.to_string().contains("EC10"));
    }

    #[test]
    fn invalid_code_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_create(&session(dir.path()), "EC", "EC-1", "Bad", None).unwrap_err();
        assert!(err.to_string().contains("invalid location code"));
    }

    #[test]
    fn stats_for_unknown_partition_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(cmd_stats(&session(dir.path()), "ZZ1").is_err());
    }
}
