//! StorageEngine: the SQLite-backed [`IProgressStore`] and
//! [`IEntitlementSource`].
//!
//! ## Write protocol
//! Every progress write is one `BEGIN IMMEDIATE` transaction:
//! read marker → write marker → add XP (lifetime + weekly) → append event →
//! commit. The immediate lock is taken before the marker is read, so the
//! check and the set cannot interleave with another writer, in this process
//! or another one on the same file.
//!
//! ## Feeds
//! `subscribe` and the entitlement writers share `feed_lock`, so a subscriber
//! registers either before a write (and receives it as an update) or after it
//! (and reads it as the initial document). Nothing is missed or duplicated.

use std::path::Path;

use chrono::{DateTime, Utc};
use nichiboku_core::config::StorageConfig;
use nichiboku_core::errors::StorageResult;
use nichiboku_core::traits::{EntitlementFeed, IEntitlementSource, IProgressStore};
use nichiboku_core::types::progress::week_key;
use nichiboku_core::types::{
    AchievementGrant, AchievementId, AchievementRecord, EnterAward, EntitlementDoc, EntryRecord,
    ScreenKey, SuccessAward, SuccessRecord, Uid, UserEvent, UserEventType, XpTotals,
};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::feeds::FeedRegistry;
use crate::pool::ConnectionPool;
use crate::queries::{achievement_ops, entitlement_ops, event_ops, progress_ops, xp_ops};
use crate::to_storage_err;

pub struct StorageEngine {
    pool: ConnectionPool,
    feeds: FeedRegistry,
    feed_lock: tokio::sync::Mutex<()>,
}

impl StorageEngine {
    /// Open the store described by `config`: file-backed when `db_path` is
    /// set, in-memory otherwise.
    pub fn open(config: &StorageConfig) -> StorageResult<Self> {
        let pool = match &config.db_path {
            Some(path) => {
                ConnectionPool::open(Path::new(path), config.read_pool_size, config.busy_timeout_ms)?
            }
            None => ConnectionPool::open_in_memory(config.busy_timeout_ms)?,
        };
        info!(
            path = config.db_path.as_deref().unwrap_or(":memory:"),
            readers = pool.reader_count(),
            "Opened authoritative store"
        );
        Ok(Self::with_pool(pool))
    }

    pub fn open_path(path: &Path) -> StorageResult<Self> {
        let config = StorageConfig {
            db_path: Some(path.to_string_lossy().into_owned()),
            ..StorageConfig::default()
        };
        Self::open(&config)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Self::open(&StorageConfig::default())
    }

    fn with_pool(pool: ConnectionPool) -> Self {
        Self {
            pool,
            feeds: FeedRegistry::new(),
            feed_lock: tokio::sync::Mutex::new(()),
        }
    }

    // ── Entitlement writer ──

    /// Replace the entitlement document of `uid` and push it to live feeds.
    pub async fn put_entitlement(&self, uid: &Uid, doc: &EntitlementDoc) -> StorageResult<()> {
        let _feeds = self.feed_lock.lock().await;
        self.pool
            .with_writer(|conn| entitlement_ops::upsert(conn, uid, doc))
            .await?;
        let delivered = self.feeds.publish(uid, &Ok(Some(doc.clone())));
        info!(
            uid = %uid,
            plan = %doc.plan,
            status = %doc.plan_status,
            delivered,
            "Entitlement document written"
        );
        Ok(())
    }

    /// Delete the entitlement document of `uid`. Live feeds receive `None`.
    pub async fn remove_entitlement(&self, uid: &Uid) -> StorageResult<bool> {
        let _feeds = self.feed_lock.lock().await;
        let removed = self
            .pool
            .with_writer(|conn| entitlement_ops::delete(conn, uid))
            .await?;
        if removed {
            let delivered = self.feeds.publish(uid, &Ok(None));
            info!(uid = %uid, delivered, "Entitlement document removed");
        }
        Ok(removed)
    }

    pub async fn entitlement(&self, uid: &Uid) -> StorageResult<Option<EntitlementDoc>> {
        self.pool
            .with_reader(|conn| entitlement_ops::get(conn, uid))
            .await
    }

    pub fn subscriber_count(&self, uid: &Uid) -> usize {
        self.feeds.subscriber_count(uid)
    }

    /// Run `f` inside one `BEGIN IMMEDIATE` transaction on the writer.
    async fn write_tx<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> StorageResult<T>,
    {
        self.pool
            .with_writer(|conn: &Connection| {
                let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
                    .map_err(to_storage_err)?;
                let out = f(&tx)?;
                tx.commit().map_err(to_storage_err)?;
                Ok(out)
            })
            .await
    }
}

/// Event metadata for a screen award: the caller's object fields plus `screen_key`.
fn screen_event_meta(screen_key: &ScreenKey, meta: Option<&Value>) -> Value {
    let mut obj = Map::new();
    obj.insert("screen_key".to_string(), Value::from(screen_key.as_str()));
    match meta {
        Some(Value::Object(fields)) => {
            for (k, v) in fields {
                obj.entry(k.clone()).or_insert_with(|| v.clone());
            }
        }
        Some(other) => {
            obj.insert("meta".to_string(), other.clone());
        }
        None => {}
    }
    Value::Object(obj)
}

fn grant_xp(
    conn: &Connection,
    uid: &Uid,
    amount: u32,
    event_type: UserEventType,
    meta: &Value,
    now: DateTime<Utc>,
) -> StorageResult<()> {
    xp_ops::add_points(conn, uid, amount, &week_key(now), now)?;
    event_ops::append(conn, uid, event_type, amount, Some(meta), now)?;
    Ok(())
}

impl IProgressStore for StorageEngine {
    async fn record_entry(
        &self,
        uid: &Uid,
        screen_key: &ScreenKey,
        award: &EnterAward,
    ) -> StorageResult<EntryRecord> {
        let now = Utc::now();
        let record = self
            .write_tx(|tx| {
                let before = progress_ops::get(tx, uid, screen_key)?;
                let first_time = before.map_or(true, |row| row.first_open_at.is_none());
                let visits = progress_ops::touch_entry(tx, uid, screen_key, now)?;

                let (xp, kind) = if first_time {
                    (award.xp_on_enter, UserEventType::ScreenOpenFirst)
                } else {
                    (award.repeat_xp, UserEventType::ScreenOpenRepeat)
                };
                if xp > 0 {
                    let meta = screen_event_meta(screen_key, award.meta.as_ref());
                    grant_xp(tx, uid, xp, kind, &meta, now)?;
                }
                Ok(EntryRecord {
                    first_time,
                    xp_granted: xp,
                    visits,
                })
            })
            .await?;
        debug!(
            uid = %uid,
            screen_key = %screen_key,
            first_time = record.first_time,
            xp = record.xp_granted,
            visits = record.visits,
            "Recorded screen entry"
        );
        Ok(record)
    }

    async fn record_success(
        &self,
        uid: &Uid,
        screen_key: &ScreenKey,
        award: &SuccessAward,
    ) -> StorageResult<SuccessRecord> {
        let now = Utc::now();
        let record = self
            .write_tx(|tx| {
                let before = progress_ops::get(tx, uid, screen_key)?;
                if before.as_ref().is_some_and(|row| row.success_at.is_some()) {
                    return Ok(SuccessRecord {
                        first_time: false,
                        xp_granted: 0,
                    });
                }
                progress_ops::mark_success(tx, uid, screen_key, now)?;
                if award.xp_on_success > 0 {
                    let meta = screen_event_meta(screen_key, award.meta.as_ref());
                    grant_xp(
                        tx,
                        uid,
                        award.xp_on_success,
                        UserEventType::ScreenSuccess,
                        &meta,
                        now,
                    )?;
                }
                Ok(SuccessRecord {
                    first_time: true,
                    xp_granted: award.xp_on_success,
                })
            })
            .await?;
        debug!(
            uid = %uid,
            screen_key = %screen_key,
            first_time = record.first_time,
            xp = record.xp_granted,
            "Recorded screen success"
        );
        Ok(record)
    }

    async fn grant_achievement(&self, uid: &Uid, grant: &AchievementGrant) -> StorageResult<bool> {
        let now = Utc::now();
        self.write_tx(|tx| {
            if !achievement_ops::insert_if_absent(tx, uid, grant, now)? {
                return Ok(false);
            }
            if grant.xp > 0 {
                xp_ops::add_points(tx, uid, grant.xp, &week_key(now), now)?;
            }
            let mut meta = Map::new();
            meta.insert(
                "achievement_id".to_string(),
                Value::from(grant.achievement_id.as_str()),
            );
            if let Some(sub) = &grant.subtitle {
                meta.insert("sub".to_string(), Value::from(sub.as_str()));
            }
            if let Some(extra) = &grant.meta {
                meta.insert("meta".to_string(), extra.clone());
            }
            event_ops::append(
                tx,
                uid,
                UserEventType::AchievementUnlocked,
                grant.xp,
                Some(&Value::Object(meta)),
                now,
            )?;
            Ok(true)
        })
        .await
    }

    async fn achievement(
        &self,
        uid: &Uid,
        achievement_id: &AchievementId,
    ) -> StorageResult<Option<AchievementRecord>> {
        self.pool
            .with_reader(|conn| achievement_ops::get(conn, uid, achievement_id))
            .await
    }

    async fn achievements(&self, uid: &Uid) -> StorageResult<Vec<AchievementRecord>> {
        self.pool
            .with_reader(|conn| achievement_ops::list(conn, uid))
            .await
    }

    async fn xp_totals(&self, uid: &Uid) -> StorageResult<XpTotals> {
        let week = week_key(Utc::now());
        self.pool
            .with_reader(|conn| xp_ops::totals(conn, uid, &week))
            .await
    }

    async fn recent_events(&self, uid: &Uid, limit: usize) -> StorageResult<Vec<UserEvent>> {
        self.pool
            .with_reader(|conn| event_ops::recent(conn, uid, limit))
            .await
    }
}

impl IEntitlementSource for StorageEngine {
    async fn subscribe(&self, uid: &Uid) -> EntitlementFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        let _feeds = self.feed_lock.lock().await;
        let current = self
            .pool
            .with_reader(|conn| entitlement_ops::get(conn, uid))
            .await;
        let _ = tx.send(current);
        self.feeds.register(uid, tx);
        debug!(uid = %uid, "Entitlement feed opened");
        rx
    }
}
