//! Store error types.

use thiserror::Error;

/// Store operation errors.
#[derive(Error, Debug, Clone)]
pub enum DbError {
    /// No record with the given id
    #[error("Evaluacion {id} not found")]
    RecordNotFound { id: u64 },

    /// Create was asked to insert a record whose id is already stored
    #[error("Evaluacion {id} already exists")]
    IdAlreadyExists { id: u64 },

    /// A new entity arrived with an id already set
    #[error("A new evaluacion cannot already have an ID (got {id})")]
    IdPreset { id: u64 },

    /// Sort directive names an unknown property or direction
    #[error("Invalid sort directive: {0}")]
    InvalidSort(String),

    /// Lock poisoned (RwLock poisoned)
    #[error("Lock poisoned")]
    LockPoisoned,

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Data corruption detected
    #[error("Data corruption detected: {0}")]
    DataCorruption(String),

    /// Disk full error during persistence
    #[error("Disk full: {0}")]
    DiskFull(String),

    /// I/O error during persistence
    #[error("I/O error: {0}")]
    IoError(String),

    /// Transient I/O error that may succeed on retry
    #[error("Transient I/O error: {0}")]
    TransientIoError(String),
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, DbError>;
