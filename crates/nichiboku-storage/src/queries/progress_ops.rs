//! screen_progress: per (uid, screen) first-open and success markers.
//!
//! `first_open_at` and `success_at` are independent markers. A success
//! recorded before any entry creates the row with `first_open_at` unset, so
//! the first real entry still counts as first.

use chrono::{DateTime, Utc};
use nichiboku_core::errors::StorageResult;
use nichiboku_core::types::{ScreenKey, Uid};
use rusqlite::{params, Connection, OptionalExtension};

use crate::to_storage_err;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenProgressRow {
    pub first_open_at: Option<String>,
    pub last_open_at: Option<String>,
    pub visits: u32,
    pub success_at: Option<String>,
}

pub fn get(conn: &Connection, uid: &Uid, screen_key: &ScreenKey) -> StorageResult<Option<ScreenProgressRow>> {
    conn.query_row(
        "SELECT first_open_at, last_open_at, visits, success_at
         FROM screen_progress WHERE uid = ?1 AND screen_key = ?2",
        params![uid.as_str(), screen_key.as_str()],
        |row| {
            Ok(ScreenProgressRow {
                first_open_at: row.get(0)?,
                last_open_at: row.get(1)?,
                visits: row.get(2)?,
                success_at: row.get(3)?,
            })
        },
    )
    .optional()
    .map_err(to_storage_err)
}

/// Count one visit and set `first_open_at` if unset. Returns the new visit count.
pub fn touch_entry(
    conn: &Connection,
    uid: &Uid,
    screen_key: &ScreenKey,
    now: DateTime<Utc>,
) -> StorageResult<u32> {
    conn.query_row(
        "INSERT INTO screen_progress (uid, screen_key, first_open_at, last_open_at, visits)
         VALUES (?1, ?2, ?3, ?3, 1)
         ON CONFLICT(uid, screen_key) DO UPDATE SET
             visits = visits + 1,
             last_open_at = excluded.last_open_at,
             first_open_at = COALESCE(first_open_at, excluded.first_open_at)
         RETURNING visits",
        params![uid.as_str(), screen_key.as_str(), now.to_rfc3339()],
        |row| row.get(0),
    )
    .map_err(to_storage_err)
}

/// Set `success_at`, creating the row if needed. Never overwrites an
/// existing success time.
pub fn mark_success(
    conn: &Connection,
    uid: &Uid,
    screen_key: &ScreenKey,
    now: DateTime<Utc>,
) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO screen_progress (uid, screen_key, visits, success_at)
         VALUES (?1, ?2, 0, ?3)
         ON CONFLICT(uid, screen_key) DO UPDATE SET
             success_at = COALESCE(success_at, excluded.success_at)",
        params![uid.as_str(), screen_key.as_str(), now.to_rfc3339()],
    )
    .map_err(to_storage_err)?;
    Ok(())
}
