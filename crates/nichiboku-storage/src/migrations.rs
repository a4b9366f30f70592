//! Schema versioning through a dedicated single-row `schema_version` table.
//! Each version bump is a const SQL string applied in order.

use nichiboku_core::errors::{StorageError, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::schema::TABLES_V1;

/// Bump when adding a migration.
pub const CURRENT_VERSION: u32 = 1;

const MIGRATIONS: [(u32, &str); 1] = [(1, TABLES_V1)];

pub fn get_schema_version(conn: &Connection) -> StorageResult<u32> {
    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .map_err(crate::to_storage_err)?;
    if !exists {
        return Ok(0);
    }
    let version: Option<u32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .optional()
        .map_err(crate::to_storage_err)?;
    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: u32) -> rusqlite::Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL) STRICT;")?;
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", params![version])?;
    Ok(())
}

/// Apply every pending migration. Each step commits with its version bump.
/// Returns the version the database ends up at.
pub fn migrate(conn: &Connection) -> StorageResult<u32> {
    let mut version = get_schema_version(conn)?;

    for (target, sql) in MIGRATIONS {
        if target <= version {
            continue;
        }
        let apply = || -> rusqlite::Result<()> {
            let tx = rusqlite::Transaction::new_unchecked(
                conn,
                rusqlite::TransactionBehavior::Immediate,
            )?;
            tx.execute_batch(sql)?;
            set_schema_version(&tx, target)?;
            tx.commit()
        };
        apply().map_err(|e| StorageError::MigrationFailed {
            version: target,
            message: e.to_string(),
        })?;
        info!(from = version, to = target, "Applied schema migration");
        version = target;
    }

    Ok(version)
}
