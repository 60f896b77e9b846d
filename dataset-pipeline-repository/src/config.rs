//! Configuration types for the repository clients.

use std::time::Duration;

/// Configuration for the PostgreSQL store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// How long to wait for a connection before reporting the store unreachable.
    pub acquire_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

/// Configuration for bulk indexing.
#[derive(Debug, Clone)]
pub struct BulkConfig {
    /// Number of documents sent in one bulk request.
    pub chunk_size: usize,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self { chunk_size: 500 }
    }
}

impl BulkConfig {
    /// Create a config with a custom chunk size.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self { chunk_size }
    }
}
