//! Store and service configuration.

use std::path::PathBuf;

/// Configuration shared by the store, the persistence layer and the API.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Data directory for persistence
    pub data_dir: PathBuf,
    /// Interval between background flushes in milliseconds
    pub persistence_interval_ms: u64,
    /// Flush the snapshot after every successful mutation
    pub sync_writes: bool,
    /// Maximum retry attempts for transient I/O errors
    pub persistence_max_retries: u32,
    /// Delay between retry attempts in milliseconds
    pub persistence_retry_delay_ms: u64,
    /// Request body read timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Application name used as the prefix of alert headers
    pub application_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            persistence_interval_ms: 1000,
            sync_writes: true,
            persistence_max_retries: 3,      // Default retry attempts
            persistence_retry_delay_ms: 100, // 100ms delay between retries
            request_timeout_ms: 5000,        // 5 seconds default
            application_name: "evaluacionApp".to_string(),
        }
    }
}
