//! xp_ledger and xp_weekly: running XP balances.

use chrono::{DateTime, Utc};
use nichiboku_core::errors::StorageResult;
use nichiboku_core::types::{Uid, XpTotals};
use rusqlite::{params, Connection, OptionalExtension};

use crate::to_storage_err;

/// Add `amount` to both the lifetime balance and the `week_key` bucket.
pub fn add_points(
    conn: &Connection,
    uid: &Uid,
    amount: u32,
    week_key: &str,
    now: DateTime<Utc>,
) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO xp_ledger (uid, points, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(uid) DO UPDATE SET
             points = points + excluded.points,
             updated_at = excluded.updated_at",
        params![uid.as_str(), amount, now.to_rfc3339()],
    )
    .map_err(to_storage_err)?;
    conn.execute(
        "INSERT INTO xp_weekly (uid, week_key, points) VALUES (?1, ?2, ?3)
         ON CONFLICT(uid, week_key) DO UPDATE SET points = points + excluded.points",
        params![uid.as_str(), week_key, amount],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

pub fn totals(conn: &Connection, uid: &Uid, week_key: &str) -> StorageResult<XpTotals> {
    let points: Option<i64> = conn
        .query_row(
            "SELECT points FROM xp_ledger WHERE uid = ?1",
            params![uid.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(to_storage_err)?;
    let weekly: Option<i64> = conn
        .query_row(
            "SELECT points FROM xp_weekly WHERE uid = ?1 AND week_key = ?2",
            params![uid.as_str(), week_key],
            |row| row.get(0),
        )
        .optional()
        .map_err(to_storage_err)?;
    Ok(XpTotals {
        points: points.unwrap_or(0).max(0) as u64,
        weekly_progress: weekly.unwrap_or(0).max(0) as u64,
        week_key: week_key.to_string(),
    })
}
