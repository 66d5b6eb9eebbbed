//! CLI tool for inspecting Evaluacion snapshots offline.
//!
//! Provides commands for:
//! - Listing and reading records
//! - Verifying snapshot integrity
//! - Exporting records as a JSON array

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use evaluacion_core::config::StoreConfig;
use evaluacion_core::persistence::PersistenceManager;
use evaluacion_core::sort::Sort;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Data directory holding the snapshot
    #[arg(long, default_value = "./data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List records, optionally sorted (e.g. `--sort id,desc`)
    List {
        #[arg(long)]
        sort: Vec<String>,
    },
    /// Print one record by id
    Get { id: u64 },
    /// Check version and checksum of the snapshot
    Verify,
    /// Write all records as a JSON array to stdout
    Export,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = StoreConfig {
        data_dir: cli.data_dir.clone(),
        ..Default::default()
    };
    let persistence = PersistenceManager::new(&config);
    tracing::debug!(
        "Using snapshot {}",
        persistence.snapshot_path().display()
    );

    match cli.command {
        Command::List { sort } => {
            let sort = Sort::from_params(sort.iter().map(String::as_str))?;
            let store = persistence.load().context("Failed to load snapshot")?;
            for record in store.find_all(&sort)? {
                println!(
                    "{}\t{}",
                    record.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
                    record
                        .status_evaluacion
                        .map_or_else(|| "null".to_string(), |s| s.to_string())
                );
            }
        }
        Command::Get { id } => {
            let store = persistence.load().context("Failed to load snapshot")?;
            let record = store.find_by_id(id)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Verify => {
            let snapshot = persistence
                .read()
                .with_context(|| format!("Snapshot {} is invalid", persistence.snapshot_path().display()))?;
            println!(
                "OK: version={} records={} next_id={} checksum={:08x}",
                snapshot.version,
                snapshot.records.len(),
                snapshot.next_id,
                snapshot.checksum
            );
        }
        Command::Export => {
            let store = persistence.load().context("Failed to load snapshot")?;
            let records = store.find_all(&Sort::unsorted())?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}
