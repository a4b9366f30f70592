//! achievements: one immutable row per (uid, achievement_id).

use chrono::{DateTime, Utc};
use nichiboku_core::errors::StorageResult;
use nichiboku_core::types::{AchievementGrant, AchievementId, AchievementRecord, Uid};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::{parse_meta, parse_timestamp, to_storage_err};

const TABLE: &str = "achievements";

/// Insert unless the row already exists. `true` only for the inserting call.
pub fn insert_if_absent(
    conn: &Connection,
    uid: &Uid,
    grant: &AchievementGrant,
    now: DateTime<Utc>,
) -> StorageResult<bool> {
    let inserted = conn
        .execute(
            "INSERT INTO achievements (uid, achievement_id, xp, subtitle, meta, unlocked_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(uid, achievement_id) DO NOTHING",
            params![
                uid.as_str(),
                grant.achievement_id.as_str(),
                grant.xp,
                grant.subtitle,
                grant.meta.as_ref().map(|m| m.to_string()),
                now.to_rfc3339(),
            ],
        )
        .map_err(to_storage_err)?;
    Ok(inserted == 1)
}

type RawRow = (String, u32, Option<String>, Option<String>, String);

fn raw_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn decode((id, xp, subtitle, meta, unlocked_at): RawRow) -> StorageResult<AchievementRecord> {
    Ok(AchievementRecord {
        achievement_id: AchievementId::new(id),
        xp,
        subtitle,
        meta: parse_meta(TABLE, meta)?,
        unlocked_at: parse_timestamp(TABLE, &unlocked_at)?,
    })
}

pub fn get(
    conn: &Connection,
    uid: &Uid,
    achievement_id: &AchievementId,
) -> StorageResult<Option<AchievementRecord>> {
    conn.query_row(
        "SELECT achievement_id, xp, subtitle, meta, unlocked_at
         FROM achievements WHERE uid = ?1 AND achievement_id = ?2",
        params![uid.as_str(), achievement_id.as_str()],
        raw_row,
    )
    .optional()
    .map_err(to_storage_err)?
    .map(decode)
    .transpose()
}

/// All achievements of `uid`, oldest first.
pub fn list(conn: &Connection, uid: &Uid) -> StorageResult<Vec<AchievementRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT achievement_id, xp, subtitle, meta, unlocked_at
             FROM achievements WHERE uid = ?1
             ORDER BY unlocked_at ASC, achievement_id ASC",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![uid.as_str()], raw_row)
        .map_err(to_storage_err)?;

    let mut out = Vec::new();
    for row in rows {
        out.push(decode(row.map_err(to_storage_err)?)?);
    }
    Ok(out)
}
