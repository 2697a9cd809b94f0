//! # Search Subcommand
//!
//! `jkwi search '{"jkwi_info.status": "Active"}'` prints every live record
//! matching all criteria. String criteria match by case-insensitive
//! substring; other values by equality.

use anyhow::{Context, Result};
use clap::Args;
use jkwi_records::SearchQuery;
use serde_json::Value;

use crate::{emit, parse_json_arg, Session};

/// Arguments for the `jkwi search` subcommand.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Criteria object mapping dotted field paths to values, inline JSON or @file.
    pub query: String,
}

/// Execute the search subcommand.
pub fn run_search(args: &SearchArgs, session: &Session) -> Result<u8> {
    emit(&cmd_search(session, &args.query)?)?;
    Ok(0)
}

pub(crate) fn cmd_search(session: &Session, query: &str) -> Result<Vec<Value>> {
    let query: SearchQuery =
        serde_json::from_value(parse_json_arg(query)?).context("invalid search criteria")?;
    Ok(session.engine.search(&query)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use crate::record;
    use jkwi_core::Actor;

    #[test]
    fn search_matches_substring_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load(None, Some(dir.path().to_path_buf())).unwrap();
        let session = Session::open(&config, Actor::system());
        crate::partition::cmd_create(&session, "EC", "EC101", "Quito", None).unwrap();
        record::cmd_create(&session, "EC101", Some(r#"{"member_info": {"full_name": "Ana Smith"}}"#))
            .unwrap();
        record::cmd_create(&session, "EC101", Some(r#"{"member_info": {"full_name": "Luis Vega"}}"#))
            .unwrap();
        record::cmd_status(&session, "EC101000002", "Active").unwrap();

        let hits = cmd_search(&session, r#"{"member_info.full_name": "SMITH"}"#).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["member_info"]["member_id"], "EC101000001");

        let hits = cmd_search(&session, r#"{"jkwi_info.status": "Active"}"#).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["member_info"]["full_name"], "Luis Vega");
    }

    #[test]
    fn rejects_non_object_query() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load(None, Some(dir.path().to_path_buf())).unwrap();
        let session = Session::open(&config, Actor::system());
        assert!(cmd_search(&session, "[1, 2]").is_err());
    }
}
