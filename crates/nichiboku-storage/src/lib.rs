//! # nichiboku-storage
//!
//! The authoritative store behind the account core. One SQLite database holds
//! entitlement documents, per-screen progress markers, achievements, XP
//! balances and the per-user event log.
//!
//! Every progress write runs inside a single `BEGIN IMMEDIATE` transaction, so
//! the idempotency marker and the XP it grants commit together, and two
//! writers racing on the same key (even from separate processes) serialize on
//! the database lock.

pub mod engine;
pub mod feeds;
pub mod migrations;
pub mod pool;
pub mod pragmas;
pub mod queries;
pub mod schema;

pub use engine::StorageEngine;
pub use pool::ConnectionPool;

use nichiboku_core::errors::StorageError;

/// Map a rusqlite error into the storage taxonomy. Lock contention that
/// outlived `busy_timeout` surfaces as [`StorageError::DbBusy`].
pub fn to_storage_err(e: rusqlite::Error) -> StorageError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ) =>
        {
            StorageError::DbBusy
        }
        _ => StorageError::SqliteError {
            message: e.to_string(),
        },
    }
}

/// Parse an RFC 3339 column value.
pub(crate) fn parse_timestamp(
    table: &str,
    raw: &str,
) -> Result<chrono::DateTime<chrono::Utc>, StorageError> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| StorageError::CorruptRow {
            table: table.to_string(),
            details: format!("bad timestamp '{raw}': {e}"),
        })
}

/// Parse an optional JSON `meta` column.
pub(crate) fn parse_meta(
    table: &str,
    raw: Option<String>,
) -> Result<Option<serde_json::Value>, StorageError> {
    raw.map(|s| {
        serde_json::from_str(&s).map_err(|e| StorageError::CorruptRow {
            table: table.to_string(),
            details: format!("bad meta json: {e}"),
        })
    })
    .transpose()
}
