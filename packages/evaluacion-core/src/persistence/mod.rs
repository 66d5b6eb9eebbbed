//! Snapshot persistence for the record store.
//!
//! The whole store is written as a single JSON snapshot with a CRC32 over
//! the records. Writes go through a temporary file and an atomic rename.

mod io_utils;
mod persistence_manager;
mod snapshot;


pub use io_utils::{classify_io_error, retry_io_operation};
pub use persistence_manager::{PersistenceManager, SNAPSHOT_FILE};
pub use snapshot::{SnapshotFile, SNAPSHOT_VERSION};

use crate::config::StoreConfig;
use crate::error::DbError;
use crate::store::EvaluacionStore;

/// Flushes the store after a mutation when synchronous writes are enabled.
///
/// Returns the write error so the caller can fail the request; the change
/// stays in memory and the background flush retries it.
pub fn save_after_write(
    persistence: &PersistenceManager,
    store: &EvaluacionStore,
    config: &StoreConfig,
) -> Result<(), DbError> {
    if !config.sync_writes {
        return Ok(());
    }
    persistence.flush_if_dirty(store).map(|_| ())
}
