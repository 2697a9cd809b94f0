//! # jkwi CLI entry point
//!
//! Parses command-line arguments, resolves configuration, and dispatches
//! to subcommand handlers. Results go to stdout as JSON; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jkwi_cli::config::CliConfig;
use jkwi_cli::partition::{run_partition, PartitionArgs};
use jkwi_cli::record::{run_record, RecordArgs};
use jkwi_cli::search::{run_search, SearchArgs};
use jkwi_cli::transfer::{run_export, run_import, ExportArgs, ImportArgs};
use jkwi_cli::Session;
use jkwi_core::Actor;

/// JKWI member records.
///
/// Partition provisioning, record lifecycle with backups and audit stamps,
/// search, statistics, and export/import over a local data directory.
#[derive(Parser, Debug)]
#[command(name = "jkwi", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Root of the record store.
    #[arg(long, env = "JKWI_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Name recorded in created_by / updated_by / deleted_by.
    #[arg(long, default_value = "system", global = true)]
    actor: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Partition provisioning, listing and statistics.
    Partition(PartitionArgs),

    /// Record create, read, update, status, delete and backups.
    Record(RecordArgs),

    /// Search live records by field path.
    Search(SearchArgs),

    /// Export a partition bundle.
    Export(ExportArgs),

    /// Import a partition bundle.
    Import(ImportArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = CliConfig::load(cli.config.as_deref(), cli.data_dir)?;
    let actor = Actor::new(cli.actor)?;
    let session = Session::open(&config, actor);

    match cli.command {
        Commands::Partition(args) => run_partition(&args, &session),
        Commands::Record(args) => run_record(&args, &session),
        Commands::Search(args) => run_search(&args, &session),
        Commands::Export(args) => run_export(&args, &session),
        Commands::Import(args) => run_import(&args, &session),
    }
}
