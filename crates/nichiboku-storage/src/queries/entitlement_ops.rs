//! entitlements: one document per uid.

use chrono::{DateTime, Utc};
use nichiboku_core::errors::StorageResult;
use nichiboku_core::types::{EntitlementDoc, Uid};
use rusqlite::{params, Connection, OptionalExtension};

use crate::{parse_timestamp, to_storage_err};

const TABLE: &str = "entitlements";

pub fn upsert(conn: &Connection, uid: &Uid, doc: &EntitlementDoc) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO entitlements (uid, plan, plan_status, plan_expires_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(uid) DO UPDATE SET
             plan = excluded.plan,
             plan_status = excluded.plan_status,
             plan_expires_at = excluded.plan_expires_at,
             updated_at = excluded.updated_at",
        params![
            uid.as_str(),
            doc.plan.as_str(),
            doc.plan_status.as_str(),
            doc.plan_expires_at.map(|t| t.to_rfc3339()),
            doc.updated_at.to_rfc3339(),
        ],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

/// Returns `true` if a document was removed.
pub fn delete(conn: &Connection, uid: &Uid) -> StorageResult<bool> {
    let n = conn
        .execute("DELETE FROM entitlements WHERE uid = ?1", params![uid.as_str()])
        .map_err(to_storage_err)?;
    Ok(n > 0)
}

type RawRow = (Option<String>, Option<String>, Option<String>, String);

pub fn get(conn: &Connection, uid: &Uid) -> StorageResult<Option<EntitlementDoc>> {
    let raw: Option<RawRow> = conn
        .query_row(
            "SELECT plan, plan_status, plan_expires_at, updated_at
             FROM entitlements WHERE uid = ?1",
            params![uid.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()
        .map_err(to_storage_err)?;

    let Some((plan, status, expires, updated)) = raw else {
        return Ok(None);
    };
    let expires: Option<DateTime<Utc>> = expires
        .as_deref()
        .map(|raw| parse_timestamp(TABLE, raw))
        .transpose()?;
    let updated = parse_timestamp(TABLE, &updated)?;
    Ok(Some(EntitlementDoc::from_raw(
        plan.as_deref(),
        status.as_deref(),
        expires,
        updated,
    )))
}
