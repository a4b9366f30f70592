//! Storage-layer errors for the authoritative store.

use super::error_code::{self, ErrorCode};

/// Errors that can occur in the storage layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Database busy (another operation in progress)")]
    DbBusy,

    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Corrupt row in {table}: {details}")]
    CorruptRow { table: String, details: String },
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DbBusy => error_code::DB_BUSY,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::Unavailable { .. } => error_code::STORE_UNAVAILABLE,
            _ => error_code::STORAGE_ERROR,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
