//! `IProgressStore`: atomic check-and-set writes for XP and achievements.
//!
//! Every write method is one atomic unit: the marker or record and the XP it
//! grants commit together or not at all. Implementations must give true
//! at-most-once semantics when several callers race on the same key.

use std::future::Future;
use std::sync::Arc;

use crate::errors::StorageResult;
use crate::types::{
    AchievementGrant, AchievementId, AchievementRecord, EnterAward, EntryRecord, ScreenKey,
    SuccessAward, SuccessRecord, Uid, UserEvent, XpTotals,
};

pub trait IProgressStore: Send + Sync + 'static {
    // ── Atomic writes ──

    /// Record an entry of `screen_key`. The first entry grants
    /// `award.xp_on_enter`; later entries grant `award.repeat_xp`.
    fn record_entry(
        &self,
        uid: &Uid,
        screen_key: &ScreenKey,
        award: &EnterAward,
    ) -> impl Future<Output = StorageResult<EntryRecord>> + Send;

    /// Record a success of `screen_key`. Only the first success grants XP.
    fn record_success(
        &self,
        uid: &Uid,
        screen_key: &ScreenKey,
        award: &SuccessAward,
    ) -> impl Future<Output = StorageResult<SuccessRecord>> + Send;

    /// Insert the achievement if absent. Returns `true` only for the call that
    /// inserted it; that call alone adds `grant.xp`.
    fn grant_achievement(
        &self,
        uid: &Uid,
        grant: &AchievementGrant,
    ) -> impl Future<Output = StorageResult<bool>> + Send;

    // ── Reads ──

    fn achievement(
        &self,
        uid: &Uid,
        achievement_id: &AchievementId,
    ) -> impl Future<Output = StorageResult<Option<AchievementRecord>>> + Send;

    fn achievements(
        &self,
        uid: &Uid,
    ) -> impl Future<Output = StorageResult<Vec<AchievementRecord>>> + Send;

    fn xp_totals(&self, uid: &Uid) -> impl Future<Output = StorageResult<XpTotals>> + Send;

    /// Newest first.
    fn recent_events(
        &self,
        uid: &Uid,
        limit: usize,
    ) -> impl Future<Output = StorageResult<Vec<UserEvent>>> + Send;
}

impl<T: IProgressStore> IProgressStore for Arc<T> {
    fn record_entry(
        &self,
        uid: &Uid,
        screen_key: &ScreenKey,
        award: &EnterAward,
    ) -> impl Future<Output = StorageResult<EntryRecord>> + Send {
        (**self).record_entry(uid, screen_key, award)
    }

    fn record_success(
        &self,
        uid: &Uid,
        screen_key: &ScreenKey,
        award: &SuccessAward,
    ) -> impl Future<Output = StorageResult<SuccessRecord>> + Send {
        (**self).record_success(uid, screen_key, award)
    }

    fn grant_achievement(
        &self,
        uid: &Uid,
        grant: &AchievementGrant,
    ) -> impl Future<Output = StorageResult<bool>> + Send {
        (**self).grant_achievement(uid, grant)
    }

    fn achievement(
        &self,
        uid: &Uid,
        achievement_id: &AchievementId,
    ) -> impl Future<Output = StorageResult<Option<AchievementRecord>>> + Send {
        (**self).achievement(uid, achievement_id)
    }

    fn achievements(
        &self,
        uid: &Uid,
    ) -> impl Future<Output = StorageResult<Vec<AchievementRecord>>> + Send {
        (**self).achievements(uid)
    }

    fn xp_totals(&self, uid: &Uid) -> impl Future<Output = StorageResult<XpTotals>> + Send {
        (**self).xp_totals(uid)
    }

    fn recent_events(
        &self,
        uid: &Uid,
        limit: usize,
    ) -> impl Future<Output = StorageResult<Vec<UserEvent>>> + Send {
        (**self).recent_events(uid, limit)
    }
}
