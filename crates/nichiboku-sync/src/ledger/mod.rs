//! ProgressLedger: at-most-once XP and achievement awards for the signed-in
//! user.
//!
//! Idempotency has two layers. The store transaction is the real boundary:
//! marker, XP and event commit together under a primary-key check, so
//! concurrent callers anywhere get exactly one grant. [`ScreenScope`] adds a
//! local claim set on top so duplicate triggers inside one mounted screen
//! never reach the store.
//!
//! Nothing here returns an error to the caller. Failures are logged with a
//! [`RecoveryAction`] and surface as [`SkipReason::WriteFailed`]; nothing is
//! persisted and the next trigger may retry.

mod claims;
mod outcome;
mod scope;

use std::sync::Arc;

use nichiboku_core::errors::{ErrorCode, RecoveryAction, StorageError, SyncError, SyncResult};
use nichiboku_core::traits::IProgressStore;
use nichiboku_core::types::{
    AchievementAward, AchievementGrant, AchievementId, AchievementRecord, EnterAward, ScreenKey,
    Session, SuccessAward, Uid, UserEvent, XpTotals,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub use claims::{ClaimGuard, ClaimSet, Claimed};
pub use outcome::{AwardOutcome, EnterOutcome, SkipReason};
pub use scope::ScreenScope;

pub struct ProgressLedger<S> {
    store: Arc<S>,
    session: watch::Receiver<Option<Session>>,
}

impl<S> Clone for ProgressLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            session: self.session.clone(),
        }
    }
}

impl<S: IProgressStore> ProgressLedger<S> {
    pub fn new(store: Arc<S>, session: watch::Receiver<Option<Session>>) -> Self {
        Self { store, session }
    }

    fn current_uid(&self) -> Option<Uid> {
        self.session.borrow().as_ref().map(|s| s.uid.clone())
    }

    /// Record an entry of `screen_key`. The first entry earns
    /// `award.xp_on_enter`; later entries earn `award.repeat_xp`. The
    /// attached achievement, if any, is requested on every entry until it
    /// lands.
    pub async fn award_on_enter(&self, screen_key: &ScreenKey, award: &EnterAward) -> EnterOutcome {
        let Some(uid) = self.current_uid() else {
            debug!(screen_key = %screen_key, "No session, entry not recorded");
            return EnterOutcome::Skipped(SkipReason::NoSession);
        };

        let record = match self.store.record_entry(&uid, screen_key, award).await {
            Ok(record) => record,
            Err(e) => {
                return EnterOutcome::Skipped(write_failed("award_on_enter", &uid, screen_key.as_str(), e))
            }
        };

        // Attached achievements are retried on every settled trigger; the
        // store ignores duplicate unlocks.
        if let Some(id) = &award.achievement_id {
            self.grant_attached(&uid, id, award.achievement_sub.as_deref())
                .await;
        }

        if !record.first_time {
            debug!(uid = %uid, screen_key = %screen_key, xp = record.xp_granted, "Repeat entry");
            return EnterOutcome::Repeat {
                xp: record.xp_granted,
                visits: record.visits,
            };
        }

        info!(uid = %uid, screen_key = %screen_key, xp = record.xp_granted, "First entry awarded");
        EnterOutcome::First {
            xp: record.xp_granted,
            visits: record.visits,
        }
    }

    /// Record a success of `screen_key`. Only the first success earns XP.
    pub async fn award_on_success(&self, screen_key: &ScreenKey, award: &SuccessAward) -> AwardOutcome {
        let Some(uid) = self.current_uid() else {
            debug!(screen_key = %screen_key, "No session, success not recorded");
            return AwardOutcome::Skipped(SkipReason::NoSession);
        };

        let record = match self.store.record_success(&uid, screen_key, award).await {
            Ok(record) => record,
            Err(e) => {
                return AwardOutcome::Skipped(write_failed("award_on_success", &uid, screen_key.as_str(), e))
            }
        };

        if let Some(id) = &award.achievement_id {
            self.grant_attached(&uid, id, award.achievement_sub.as_deref())
                .await;
        }

        if record.first_time {
            info!(uid = %uid, screen_key = %screen_key, xp = record.xp_granted, "First success awarded");
            AwardOutcome::Granted {
                xp: record.xp_granted,
            }
        } else {
            debug!(uid = %uid, screen_key = %screen_key, "Success already recorded");
            AwardOutcome::AlreadyGranted
        }
    }

    /// Grant `achievement_id` once per user. `award.xp` is added only by the
    /// call that inserts the record.
    pub async fn award_achievement(
        &self,
        achievement_id: &AchievementId,
        award: &AchievementAward,
    ) -> AwardOutcome {
        let Some(uid) = self.current_uid() else {
            debug!(achievement_id = %achievement_id, "No session, achievement not granted");
            return AwardOutcome::Skipped(SkipReason::NoSession);
        };
        self.grant(&uid, AchievementGrant::new(achievement_id.clone(), award))
            .await
    }

    async fn grant(&self, uid: &Uid, grant: AchievementGrant) -> AwardOutcome {
        match self.store.grant_achievement(uid, &grant).await {
            Ok(true) => {
                info!(uid = %uid, achievement_id = %grant.achievement_id, xp = grant.xp, "Achievement unlocked");
                AwardOutcome::Granted { xp: grant.xp }
            }
            Ok(false) => {
                debug!(uid = %uid, achievement_id = %grant.achievement_id, "Achievement already unlocked");
                AwardOutcome::AlreadyGranted
            }
            Err(e) => AwardOutcome::Skipped(write_failed(
                "award_achievement",
                uid,
                grant.achievement_id.as_str(),
                e,
            )),
        }
    }

    /// Achievements attached to screen awards carry no XP of their own.
    async fn grant_attached(&self, uid: &Uid, id: &AchievementId, sub: Option<&str>) {
        let mut award = AchievementAward::new(0);
        award.sub = sub.map(str::to_string);
        self.grant(uid, AchievementGrant::new(id.clone(), &award)).await;
    }

    // ── Reads (confirmed store state only) ──

    fn require_uid(&self) -> SyncResult<Uid> {
        self.current_uid().ok_or(SyncError::IdentityUnavailable)
    }

    pub async fn xp_totals(&self) -> SyncResult<XpTotals> {
        let uid = self.require_uid()?;
        Ok(self.store.xp_totals(&uid).await?)
    }

    pub async fn achievement(&self, achievement_id: &AchievementId) -> SyncResult<Option<AchievementRecord>> {
        let uid = self.require_uid()?;
        Ok(self.store.achievement(&uid, achievement_id).await?)
    }

    pub async fn achievements(&self) -> SyncResult<Vec<AchievementRecord>> {
        let uid = self.require_uid()?;
        Ok(self.store.achievements(&uid).await?)
    }

    pub async fn recent_events(&self, limit: usize) -> SyncResult<Vec<UserEvent>> {
        let uid = self.require_uid()?;
        Ok(self.store.recent_events(&uid, limit).await?)
    }
}

fn write_failed(op: &'static str, uid: &Uid, key: &str, e: StorageError) -> SkipReason {
    let err = SyncError::AwardWrite(e);
    let action = RecoveryAction::for_error(&err);
    warn!(
        op,
        uid = %uid,
        key,
        code = err.error_code(),
        recovery = %action,
        error = %err,
        "Award write failed, nothing persisted"
    );
    SkipReason::WriteFailed
}
