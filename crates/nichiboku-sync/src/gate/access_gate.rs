//! AccessGate: re-evaluates a [`Requirement`] against the live mirror state.

use nichiboku_core::config::GateConfig;
use nichiboku_core::types::{EntitlementState, Plan, PlanStatus};
use tokio::sync::watch;
use tracing::debug;

use super::requirement::{has_access, Requirement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The mirror has not delivered a snapshot yet. Show neither content nor
    /// the blocked screen.
    Loading,
    Allow,
    Deny {
        required: Requirement,
        plan: Plan,
        status: PlanStatus,
    },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Everything the blocked screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedNotice {
    pub required: Requirement,
    pub plan: Plan,
    pub status: PlanStatus,
    pub upgrade_route: String,
    pub title: String,
    pub message: String,
    pub action_label: String,
}

impl BlockedNotice {
    fn new(required: Requirement, plan: Plan, status: PlanStatus, config: &GateConfig) -> Self {
        Self {
            required,
            plan,
            status,
            upgrade_route: config.upgrade_route.clone(),
            title: "Content locked".to_string(),
            message: format!(
                "This module is only available to users with a {} plan.",
                required.plan_label()
            ),
            action_label: "See plans and activate access".to_string(),
        }
    }

    /// e.g. `Your current plan: premium (inactive)`.
    pub fn current_plan_line(&self) -> String {
        format!("Your current plan: {} ({})", self.plan, self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView<T> {
    Loading(String),
    Content(T),
    Blocked(BlockedNotice),
}

pub struct AccessGate {
    required: Requirement,
    state: watch::Receiver<EntitlementState>,
    config: GateConfig,
}

impl AccessGate {
    pub fn new(required: Requirement, state: watch::Receiver<EntitlementState>, config: GateConfig) -> Self {
        Self {
            required,
            state,
            config,
        }
    }

    pub fn required(&self) -> Requirement {
        self.required
    }

    pub fn decision(&self) -> GateDecision {
        let state = *self.state.borrow();
        evaluate(self.required, &state)
    }

    /// Wait for the next mirror change and return the fresh decision.
    /// `None` once the mirror is gone.
    pub async fn changed(&mut self) -> Option<GateDecision> {
        self.state.changed().await.ok()?;
        let decision = self.decision();
        debug!(required = %self.required, ?decision, "Access decision re-evaluated");
        Some(decision)
    }

    /// Pick what to show: a loading indicator, `content`, or the blocked screen.
    pub fn render<T>(&self, content: T) -> GateView<T> {
        match self.decision() {
            GateDecision::Loading => GateView::Loading(self.config.loading_message.clone()),
            GateDecision::Allow => GateView::Content(content),
            GateDecision::Deny {
                required,
                plan,
                status,
            } => GateView::Blocked(BlockedNotice::new(required, plan, status, &self.config)),
        }
    }
}

fn evaluate(required: Requirement, state: &EntitlementState) -> GateDecision {
    match state.snapshot() {
        None => GateDecision::Loading,
        Some(snapshot) if has_access(snapshot, required) => GateDecision::Allow,
        Some(snapshot) => GateDecision::Deny {
            required,
            plan: snapshot.plan(),
            status: snapshot.status(),
        },
    }
}
