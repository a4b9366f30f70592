//! SQLite PRAGMA configuration. Must be applied to every connection right
//! after it is opened.

use std::time::Duration;

use nichiboku_core::errors::StorageResult;
use rusqlite::Connection;

use crate::to_storage_err;

/// Writer PRAGMAs: WAL so readers never block the writer, and a busy timeout
/// as the primary wait mechanism when another writer holds the lock.
pub fn configure_connection(conn: &Connection, busy_timeout_ms: u64) -> StorageResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA cache_size = -8000;
        PRAGMA temp_store = MEMORY;
        ",
    )
    .map_err(to_storage_err)?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
        .map_err(to_storage_err)?;
    Ok(())
}

/// Reader PRAGMAs: same as the writer plus `query_only`.
pub fn configure_readonly_connection(conn: &Connection, busy_timeout_ms: u64) -> StorageResult<()> {
    configure_connection(conn, busy_timeout_ms)?;
    conn.execute_batch("PRAGMA query_only = ON;")
        .map_err(to_storage_err)?;
    Ok(())
}
