//! Authoritative store configuration.

use serde::{Deserialize, Serialize};

use crate::errors::{SyncError, SyncResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file. `None` opens an in-memory store.
    pub db_path: Option<String>,
    /// Reader connections for file-backed stores.
    pub read_pool_size: usize,
    /// SQLite busy timeout; the primary wait mechanism when two writers race.
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            read_pool_size: 2,
            busy_timeout_ms: 5000,
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> SyncResult<()> {
        if self.read_pool_size == 0 {
            return Err(SyncError::Configuration(
                "storage.read_pool_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
