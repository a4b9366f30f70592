//! ScreenScope: the ledger as seen from one mounted screen.
//!
//! Each award kind is guarded by a claim key. A duplicate call while the
//! first is in flight returns `Skipped(InFlight)`; a call after the first
//! settled is answered locally without touching the store. Failed attempts
//! release their claim.

use std::sync::Arc;

use nichiboku_core::awards::{AwardCatalog, AwardMode};
use nichiboku_core::traits::IProgressStore;
use nichiboku_core::types::{AchievementAward, AchievementId, EnterAward, ScreenKey, SuccessAward};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{AwardOutcome, ClaimSet, Claimed, EnterOutcome, ProgressLedger, SkipReason};

const ENTER_KEY: &str = "enter";
const SUCCESS_KEY: &str = "success";

pub struct ScreenScope<S> {
    ledger: ProgressLedger<S>,
    screen_key: ScreenKey,
    catalog: Arc<AwardCatalog>,
    claims: ClaimSet,
}

impl<S> Clone for ScreenScope<S> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            screen_key: self.screen_key.clone(),
            catalog: Arc::clone(&self.catalog),
            claims: self.claims.clone(),
        }
    }
}

impl<S: IProgressStore> ScreenScope<S> {
    pub fn new(ledger: ProgressLedger<S>, screen_key: ScreenKey, catalog: Arc<AwardCatalog>) -> Self {
        Self {
            ledger,
            screen_key,
            catalog,
            claims: ClaimSet::new(),
        }
    }

    pub fn screen_key(&self) -> &ScreenKey {
        &self.screen_key
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// Record the screen entry once per scope.
    pub async fn award_on_enter(&self, award: &EnterAward) -> EnterOutcome {
        let guard = match self.claims.try_claim(ENTER_KEY) {
            Ok(guard) => guard,
            Err(claimed) => {
                debug!(screen_key = %self.screen_key, ?claimed, "Entry already handled in this scope");
                return match claimed {
                    Claimed::InFlight => EnterOutcome::Skipped(SkipReason::InFlight),
                    Claimed::Settled => EnterOutcome::AlreadyEntered,
                };
            }
        };
        let outcome = self.ledger.award_on_enter(&self.screen_key, award).await;
        if outcome.is_settled() {
            guard.settle();
        }
        outcome
    }

    /// Fire-and-forget entry award for the mount path. Must be called inside
    /// a Tokio runtime.
    pub fn enter(&self, award: EnterAward) -> JoinHandle<EnterOutcome> {
        let scope = self.clone();
        tokio::spawn(async move { scope.award_on_enter(&award).await })
    }

    pub async fn award_on_success(&self, award: &SuccessAward) -> AwardOutcome {
        let guard = match self.claims.try_claim(SUCCESS_KEY) {
            Ok(guard) => guard,
            Err(claimed) => return local_answer(&self.screen_key, SUCCESS_KEY, claimed),
        };
        let outcome = self.ledger.award_on_success(&self.screen_key, award).await;
        if outcome.is_settled() {
            guard.settle();
        }
        outcome
    }

    pub async fn award_achievement(
        &self,
        achievement_id: &AchievementId,
        award: &AchievementAward,
    ) -> AwardOutcome {
        let key = format!("achievement:{achievement_id}");
        let guard = match self.claims.try_claim(&key) {
            Ok(guard) => guard,
            Err(claimed) => return local_answer(&self.screen_key, &key, claimed),
        };
        let outcome = self.ledger.award_achievement(achievement_id, award).await;
        if outcome.is_settled() {
            guard.settle();
        }
        outcome
    }

    /// Apply the catalog rule for this screen if it is earned on entry.
    /// `None` when the screen has no rule or its rule is earned on success.
    pub async fn enter_from_catalog(&self) -> Option<EnterOutcome> {
        let rule = self.catalog.resolve(&self.screen_key)?;
        if rule.mode != AwardMode::OnEnter {
            return None;
        }
        let mut award = EnterAward::new(rule.points, 0);
        if let Some(id) = rule.achievement_id {
            award = award.with_achievement(id, None);
        }
        Some(self.award_on_enter(&award).await)
    }

    /// Apply the catalog rule for this screen if it is earned on success.
    pub async fn succeed_from_catalog(&self) -> Option<AwardOutcome> {
        let rule = self.catalog.resolve(&self.screen_key)?;
        if rule.mode != AwardMode::OnSuccess {
            return None;
        }
        let mut award = SuccessAward::new(rule.points);
        if let Some(id) = rule.achievement_id {
            award = award.with_achievement(id, None);
        }
        Some(self.award_on_success(&award).await)
    }
}

fn local_answer(screen_key: &ScreenKey, key: &str, claimed: Claimed) -> AwardOutcome {
    debug!(screen_key = %screen_key, key, ?claimed, "Answered from scope claims");
    match claimed {
        Claimed::InFlight => AwardOutcome::Skipped(SkipReason::InFlight),
        Claimed::Settled => AwardOutcome::AlreadyGranted,
    }
}
