//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use nichiboku_core::errors::{StorageError, StorageResult};
use nichiboku_core::traits::{EntitlementFeed, EntitlementUpdate, IEntitlementSource, IProgressStore};
use nichiboku_core::types::{
    AchievementGrant, AchievementId, AchievementRecord, EnterAward, EntitlementDoc,
    EntitlementState, EntryRecord, Plan, PlanStatus, ScreenKey, SuccessAward, SuccessRecord, Uid,
    UserEvent, XpTotals,
};
use nichiboku_storage::StorageEngine;
use tokio::sync::{mpsc, watch};

/// Entitlement source driven by hand. Subscribing delivers nothing until
/// the test pushes.
#[derive(Default)]
pub struct ManualSource {
    feeds: Mutex<Vec<(Uid, mpsc::UnboundedSender<EntitlementUpdate>)>>,
    subscriptions: AtomicUsize,
}

impl ManualSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `update` to every open feed of `uid`. Returns deliveries.
    pub fn push(&self, uid: &str, update: EntitlementUpdate) -> usize {
        let feeds = self.feeds.lock().unwrap();
        feeds
            .iter()
            .filter(|(u, _)| u.as_str() == uid)
            .filter(|(_, tx)| tx.send(update.clone()).is_ok())
            .count()
    }

    pub fn push_doc(&self, uid: &str, plan: Plan, status: PlanStatus) -> usize {
        self.push(uid, Ok(Some(EntitlementDoc::new(plan, status))))
    }

    pub fn push_error(&self, uid: &str) -> usize {
        self.push(
            uid,
            Err(StorageError::Unavailable {
                reason: "listener dropped".to_string(),
            }),
        )
    }

    /// Drop every sender for `uid`, ending those feeds.
    pub fn close(&self, uid: &str) {
        self.feeds.lock().unwrap().retain(|(u, _)| u.as_str() != uid);
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    pub async fn wait_for_subscriptions(&self, n: usize) {
        for _ in 0..500 {
            if self.subscription_count() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("expected {n} subscriptions, saw {}", self.subscription_count());
    }
}

impl IEntitlementSource for ManualSource {
    async fn subscribe(&self, uid: &Uid) -> EntitlementFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.feeds.lock().unwrap().push((uid.clone(), tx));
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        rx
    }
}

/// Wraps a real engine; the next `failures` writes fail with `DbBusy`
/// before reaching the database. `grant_failures` trips achievement
/// grants only.
pub struct FlakyStore {
    pub inner: StorageEngine,
    failures: AtomicUsize,
    grant_failures: AtomicUsize,
}

impl FlakyStore {
    pub fn new(failures: usize) -> Self {
        Self {
            inner: StorageEngine::open_in_memory().unwrap(),
            failures: AtomicUsize::new(failures),
            grant_failures: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn fail_next_grants(&self, n: usize) {
        self.grant_failures.store(n, Ordering::SeqCst);
    }

    fn trip(&self) -> StorageResult<()> {
        Self::trip_counter(&self.failures)
    }

    fn trip_counter(counter: &AtomicUsize) -> StorageResult<()> {
        let tripped = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if tripped {
            Err(StorageError::DbBusy)
        } else {
            Ok(())
        }
    }
}

impl IProgressStore for FlakyStore {
    async fn record_entry(
        &self,
        uid: &Uid,
        screen_key: &ScreenKey,
        award: &EnterAward,
    ) -> StorageResult<EntryRecord> {
        self.trip()?;
        self.inner.record_entry(uid, screen_key, award).await
    }

    async fn record_success(
        &self,
        uid: &Uid,
        screen_key: &ScreenKey,
        award: &SuccessAward,
    ) -> StorageResult<SuccessRecord> {
        self.trip()?;
        self.inner.record_success(uid, screen_key, award).await
    }

    async fn grant_achievement(&self, uid: &Uid, grant: &AchievementGrant) -> StorageResult<bool> {
        self.trip()?;
        Self::trip_counter(&self.grant_failures)?;
        self.inner.grant_achievement(uid, grant).await
    }

    async fn achievement(
        &self,
        uid: &Uid,
        achievement_id: &AchievementId,
    ) -> StorageResult<Option<AchievementRecord>> {
        self.inner.achievement(uid, achievement_id).await
    }

    async fn achievements(&self, uid: &Uid) -> StorageResult<Vec<AchievementRecord>> {
        self.inner.achievements(uid).await
    }

    async fn xp_totals(&self, uid: &Uid) -> StorageResult<XpTotals> {
        self.inner.xp_totals(uid).await
    }

    async fn recent_events(&self, uid: &Uid, limit: usize) -> StorageResult<Vec<UserEvent>> {
        self.inner.recent_events(uid, limit).await
    }
}

/// Wait until the watched state satisfies `pred`, failing after 5s.
pub async fn wait_for_state(
    rx: &mut watch::Receiver<EntitlementState>,
    pred: impl FnMut(&EntitlementState) -> bool,
) -> EntitlementState {
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("timed out waiting for entitlement state")
        .expect("mirror dropped");
    *state
}

/// Let spawned tasks run for a moment.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
}
