//! user_events: append-only per-user activity log.

use chrono::{DateTime, Utc};
use nichiboku_core::errors::{StorageError, StorageResult};
use nichiboku_core::types::{Uid, UserEvent, UserEventType};
use rusqlite::{params, Connection};

use crate::{parse_meta, parse_timestamp, to_storage_err};

const TABLE: &str = "user_events";

pub fn append(
    conn: &Connection,
    uid: &Uid,
    event_type: UserEventType,
    amount: u32,
    meta: Option<&serde_json::Value>,
    now: DateTime<Utc>,
) -> StorageResult<i64> {
    conn.execute(
        "INSERT INTO user_events (uid, event_type, amount, meta, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            uid.as_str(),
            event_type.as_str(),
            amount,
            meta.map(|m| m.to_string()),
            now.to_rfc3339(),
        ],
    )
    .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}

/// Newest first.
pub fn recent(conn: &Connection, uid: &Uid, limit: usize) -> StorageResult<Vec<UserEvent>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, event_type, amount, meta, created_at
             FROM user_events WHERE uid = ?1
             ORDER BY id DESC LIMIT ?2",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![uid.as_str(), limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })
        .map_err(to_storage_err)?;

    let mut events = Vec::new();
    for row in rows {
        let (id, kind, amount, meta, created_at) = row.map_err(to_storage_err)?;
        let event_type = UserEventType::parse(&kind).ok_or_else(|| StorageError::CorruptRow {
            table: TABLE.to_string(),
            details: format!("unknown event type '{kind}'"),
        })?;
        events.push(UserEvent {
            id,
            event_type,
            amount,
            meta: parse_meta(TABLE, meta)?,
            created_at: parse_timestamp(TABLE, &created_at)?,
        });
    }
    Ok(events)
}
