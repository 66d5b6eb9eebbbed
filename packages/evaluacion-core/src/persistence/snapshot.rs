//! Snapshot file format.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::entity::Evaluacion;
use crate::error::DbError;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk snapshot of the record store.
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotFile {
    /// Format version
    pub version: u32,
    /// Next id the store will hand out
    pub next_id: u64,
    /// CRC32 of the serialized `records` array
    pub checksum: u32,
    /// Stored records in id order
    pub records: Vec<Evaluacion>,
}

impl SnapshotFile {
    /// Builds a snapshot and computes its checksum.
    pub fn new(records: Vec<Evaluacion>, next_id: u64) -> Result<Self, DbError> {
        let checksum = records_checksum(&records)?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            next_id,
            checksum,
            records,
        })
    }

    /// Checks the version and checksum.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(DbError::DataCorruption(format!(
                "Unsupported snapshot version: {}",
                self.version
            )));
        }
        let actual = records_checksum(&self.records)?;
        if actual != self.checksum {
            return Err(DbError::DataCorruption(format!(
                "Checksum mismatch: expected {:08x}, got {:08x}",
                self.checksum, actual
            )));
        }
        Ok(())
    }
}

fn records_checksum(records: &[Evaluacion]) -> Result<u32, DbError> {
    let bytes =
        serde_json::to_vec(records).map_err(|e| DbError::SerializationError(e.to_string()))?;
    let mut hasher = Hasher::new();
    hasher.update(&bytes);
    Ok(hasher.finalize())
}
