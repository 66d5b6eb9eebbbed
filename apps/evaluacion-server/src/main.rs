//! REST API server for Evaluacion records.
//!
//! Loads the snapshot, runs the background flush thread and serves the
//! API until Ctrl+C, then writes a final snapshot.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use evaluacion_api::{router::Router, server::Server};
use evaluacion_core::config::StoreConfig;
use evaluacion_core::error::DbError;
use evaluacion_core::persistence::PersistenceManager;
use evaluacion_core::EvaluacionStore;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the Evaluacion server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Data directory for persistence
    #[arg(long, default_value = "./data")]
    data_dir: String,

    /// Interval between background snapshot flushes in milliseconds
    #[arg(long, default_value_t = 1000)]
    persistence_interval_ms: u64,

    /// Only flush in the background instead of after every write
    #[arg(long)]
    no_sync_writes: bool,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    request_timeout_ms: u64,

    /// Application name used in alert headers
    #[arg(long, default_value = "evaluacionApp")]
    application_name: String,
}

impl Args {
    fn to_config(&self) -> StoreConfig {
        StoreConfig {
            data_dir: PathBuf::from(&self.data_dir),
            persistence_interval_ms: self.persistence_interval_ms,
            sync_writes: !self.no_sync_writes,
            request_timeout_ms: self.request_timeout_ms,
            application_name: self.application_name.clone(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(args.to_config());
    let persistence = Arc::new(PersistenceManager::new(&config));

    let store = match persistence.load() {
        Ok(store) => Arc::new(store),
        Err(DbError::DataCorruption(msg)) => {
            tracing::error!("Snapshot corruption detected: {}", msg);
            tracing::error!("Server cannot start. Please restore the snapshot from backup.");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to load evaluacion snapshot"),
    };

    let running = Arc::new(AtomicBool::new(true));
    let flusher = spawn_flush_thread(
        Arc::clone(&store),
        Arc::clone(&persistence),
        Duration::from_millis(config.persistence_interval_ms.max(1)),
        Arc::clone(&running),
    );

    let router = Router::new(Arc::clone(&store), Arc::clone(&persistence), Arc::clone(&config));
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("Invalid listen address")?;
    let server = Server::new(addr, router);

    tracing::info!(
        host = %args.host,
        port = args.port,
        data_dir = %args.data_dir,
        sync_writes = config.sync_writes,
        request_timeout_ms = config.request_timeout_ms,
        "Starting evaluacion server"
    );

    server
        .serve_with_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl_c: {}", e);
            }
        })
        .await
        .context("Server error")?;

    tracing::info!("Shutting down server...");
    running.store(false, Ordering::Release);
    if flusher.join().is_err() {
        tracing::error!("Flush thread panicked");
    }
    persistence
        .flush_if_dirty(&store)
        .context("Final snapshot flush failed")?;

    Ok(())
}

/// Periodically writes the snapshot when the store has unflushed changes.
fn spawn_flush_thread(
    store: Arc<EvaluacionStore>,
    persistence: Arc<PersistenceManager>,
    interval: Duration,
    running: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut successful_flushes = 0u64;
        let mut failed_flushes = 0u64;
        let mut last_metrics_log = Instant::now();

        while running.load(Ordering::Acquire) {
            let tick_start = Instant::now();

            match persistence.flush_if_dirty(&store) {
                Ok(true) => successful_flushes += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!("Background snapshot flush failed: {}", e);
                    failed_flushes += 1;
                }
            }

            if last_metrics_log.elapsed() > Duration::from_secs(60) {
                tracing::info!(
                    "Persistence metrics: successful_flushes={}, failed_flushes={}",
                    successful_flushes,
                    failed_flushes
                );
                last_metrics_log = Instant::now();
            }

            if let Some(remaining) = interval.checked_sub(tick_start.elapsed()) {
                thread::sleep(remaining);
            }
        }
    })
}
