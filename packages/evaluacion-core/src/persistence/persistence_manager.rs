//! Persistence manager for the snapshot file.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::config::StoreConfig;
use crate::error::DbError;
use crate::store::EvaluacionStore;

use super::io_utils::{classify_io_error, retry_io_operation};
use super::snapshot::SnapshotFile;

/// Snapshot file name inside the data directory.
pub const SNAPSHOT_FILE: &str = "evaluacions.json";

/// Persistence manager for the store snapshot.
#[derive(Debug)]
pub struct PersistenceManager {
    /// Data directory path
    data_dir: PathBuf,
    /// Modification count of the store at the last successful flush
    flushed_modifications: AtomicU64,
    /// Serializes writers so an older snapshot never replaces a newer one
    write_lock: Mutex<()>,
    /// Maximum retry attempts for transient I/O errors
    max_retries: u32,
    /// Delay between retry attempts in milliseconds
    retry_delay_ms: u64,
}

impl PersistenceManager {
    /// Creates a new persistence manager with the given configuration.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            flushed_modifications: AtomicU64::new(0),
            write_lock: Mutex::new(()),
            max_retries: config.persistence_max_retries,
            retry_delay_ms: config.persistence_retry_delay_ms,
        }
    }

    /// Path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    /// Loads the store from disk.
    ///
    /// A missing snapshot yields an empty store.
    ///
    /// # Errors
    /// `DataCorruption` on version or checksum mismatch and on invalid
    /// records; `SerializationError` if the file is not valid JSON.
    pub fn load(&self) -> Result<EvaluacionStore, DbError> {
        let path = self.snapshot_path();
        if !path.exists() {
            tracing::info!("No snapshot at {}, starting empty", path.display());
            return Ok(EvaluacionStore::new());
        }

        let snapshot = read_snapshot(&path)?;
        let count = snapshot.records.len();
        let store = EvaluacionStore::from_records(snapshot.records, snapshot.next_id)?;
        tracing::info!("Loaded {} evaluacions from {}", count, path.display());
        Ok(store)
    }

    /// Writes the store to disk unconditionally.
    pub fn save(&self, store: &EvaluacionStore) -> Result<(), DbError> {
        let _guard = self.write_lock.lock().map_err(|_| DbError::LockPoisoned)?;
        let (records, next_id, modifications) = store.snapshot()?;
        let snapshot = SnapshotFile::new(records, next_id)?;
        retry_io_operation(
            || self.write_snapshot(&snapshot),
            self.max_retries,
            self.retry_delay_ms,
            "save_snapshot",
        )?;
        self.flushed_modifications
            .fetch_max(modifications, Ordering::AcqRel);
        Ok(())
    }

    /// Writes the store only if it changed since the last flush.
    ///
    /// Returns whether a write happened.
    pub fn flush_if_dirty(&self, store: &EvaluacionStore) -> Result<bool, DbError> {
        if !self.is_dirty(store) {
            return Ok(false);
        }
        self.save(store)?;
        tracing::debug!("Flushed evaluacion snapshot");
        Ok(true)
    }

    /// Whether the store has modifications that are not on disk.
    pub fn is_dirty(&self, store: &EvaluacionStore) -> bool {
        store.modifications() > self.flushed_modifications.load(Ordering::Acquire)
    }

    /// Reads and validates the snapshot without building a store.
    pub fn read(&self) -> Result<SnapshotFile, DbError> {
        read_snapshot(&self.snapshot_path())
    }

    fn write_snapshot(&self, snapshot: &SnapshotFile) -> Result<(), DbError> {
        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| DbError::SerializationError(e.to_string()))?;

        let temp_path = self.data_dir.join(format!("{}.tmp", SNAPSHOT_FILE));
        let final_path = self.snapshot_path();

        fs::create_dir_all(&self.data_dir)
            .map_err(|e| classify_io_error(e, "Failed to create data directory"))?;

        let mut file = File::create(&temp_path)
            .map_err(|e| classify_io_error(e, "Failed to create temp file"))?;
        file.write_all(&json)
            .map_err(|e| classify_io_error(e, "Failed to write snapshot"))?;
        file.sync_all()
            .map_err(|e| classify_io_error(e, "Failed to sync snapshot"))?;

        fs::rename(&temp_path, &final_path)
            .map_err(|e| classify_io_error(e, "Failed to rename snapshot file"))?;

        Ok(())
    }
}

fn read_snapshot(path: &Path) -> Result<SnapshotFile, DbError> {
    let mut file =
        File::open(path).map_err(|e| classify_io_error(e, "Failed to open snapshot file"))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| classify_io_error(e, "Failed to read snapshot file"))?;

    let snapshot: SnapshotFile = serde_json::from_str(&contents)
        .map_err(|e| DbError::SerializationError(format!("Failed to parse snapshot: {}", e)))?;
    snapshot.validate()?;
    Ok(snapshot)
}
