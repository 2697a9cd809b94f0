//! # Record Subcommand
//!
//! Record lifecycle against the data directory. Records are addressed by
//! identifier (`EC101000001`); the partition is resolved from its code.
//!
//! - `create <code> [seed]`: new record from the partition template.
//! - `get <id>`: print the live record.
//! - `update <id> <json>`: deep-merge a partial update, backing up first.
//! - `status <id> <status>`: validated lifecycle change.
//! - `delete <id>`: soft delete into `archive/`.
//! - `backups <id>`: list snapshots; `--counter N` prints one.
//! - `list <code>`: every live record in a partition.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use jkwi_core::{LocationCode, RecordId, RecordStatus};
use serde_json::{json, Value};

use crate::{emit, parse_json_arg, Session};

/// Arguments for the `jkwi record` subcommand.
#[derive(Args, Debug)]
pub struct RecordArgs {
    #[command(subcommand)]
    pub command: RecordCommand,
}

/// Record subcommands.
#[derive(Subcommand, Debug)]
pub enum RecordCommand {
    /// Create a record from the partition template.
    Create {
        /// Location code of the partition.
        code: String,
        /// Seed merged into the template, inline JSON or @file.
        seed: Option<String>,
    },

    /// Print a live record.
    Get {
        /// Record identifier.
        id: String,
    },

    /// Apply a partial update.
    Update {
        /// Record identifier.
        id: String,
        /// Update object, inline JSON or @file.
        update: String,
    },

    /// Change lifecycle status (Pending, Active, Inactive, Deleted).
    Status {
        /// Record identifier.
        id: String,
        /// Target status, case-insensitive.
        status: String,
    },

    /// Soft delete a record into the partition archive.
    Delete {
        /// Record identifier.
        id: String,
    },

    /// List backups of a record, or print one with `--counter`.
    Backups {
        /// Record identifier.
        id: String,
        /// Backup counter to print.
        #[arg(long)]
        counter: Option<u64>,
    },

    /// List every live record in a partition.
    List {
        /// Location code of the partition.
        code: String,
    },
}

/// Execute the record subcommand.
pub fn run_record(args: &RecordArgs, session: &Session) -> Result<u8> {
    let output = match &args.command {
        RecordCommand::Create { code, seed } => cmd_create(session, code, seed.as_deref())?,
        RecordCommand::Get { id } => cmd_get(session, id)?,
        RecordCommand::Update { id, update } => cmd_update(session, id, update)?,
        RecordCommand::Status { id, status } => cmd_status(session, id, status)?,
        RecordCommand::Delete { id } => cmd_delete(session, id)?,
        RecordCommand::Backups { id, counter } => cmd_backups(session, id, *counter)?,
        RecordCommand::List { code } => cmd_list(session, code)?,
    };
    emit(&output)?;
    Ok(0)
}

fn record_id(raw: &str) -> Result<RecordId> {
    RecordId::parse(raw).with_context(|| format!("invalid record id \"{raw}\""))
}

fn location_code(raw: &str) -> Result<LocationCode> {
    LocationCode::new(raw).context("invalid location code")
}

pub(crate) fn cmd_create(session: &Session, code: &str, seed: Option<&str>) -> Result<Value> {
    let code = location_code(code)?;
    let seed = seed.map(parse_json_arg).transpose()?.unwrap_or(Value::Null);
    let id = session.engine.create(&code, &seed, &session.actor)?;
    let record = session
        .engine
        .read(&id)?
        .ok_or_else(|| anyhow!("record {id} vanished after create"))?;
    Ok(json!({ "id": id, "record": record }))
}

pub(crate) fn cmd_get(session: &Session, id: &str) -> Result<Value> {
    let id = record_id(id)?;
    session
        .engine
        .read(&id)?
        .ok_or_else(|| anyhow!("record not found: {id}"))
}

pub(crate) fn cmd_update(session: &Session, id: &str, update: &str) -> Result<Value> {
    let id = record_id(id)?;
    let update = parse_json_arg(update)?;
    Ok(session.engine.apply_update(&id, &update, &session.actor)?)
}

pub(crate) fn cmd_status(session: &Session, id: &str, status: &str) -> Result<Value> {
    let id = record_id(id)?;
    let status: RecordStatus = status.parse()?;
    Ok(session.engine.set_status(&id, status, &session.actor)?)
}

pub(crate) fn cmd_delete(session: &Session, id: &str) -> Result<Value> {
    let id = record_id(id)?;
    Ok(session.engine.soft_delete(&id, &session.actor)?)
}

pub(crate) fn cmd_backups(session: &Session, id: &str, counter: Option<u64>) -> Result<Value> {
    let id = record_id(id)?;
    match counter {
        Some(counter) => session
            .engine
            .read_backup(&id, counter)?
            .ok_or_else(|| anyhow!("backup {counter} of {id} not found")),
        None => Ok(serde_json::to_value(session.engine.backups(&id)?)?),
    }
}

pub(crate) fn cmd_list(session: &Session, code: &str) -> Result<Value> {
    let code = location_code(code)?;
    Ok(Value::Array(session.engine.list(&code)?))
}
