//! Plan tiers, plan status, and the derived entitlement snapshot.
//!
//! ## Derived capabilities
//! - **is_premium_active**: plan = premium and status = active
//! - **is_student_active**: plan = student and status = active
//! - **has_any_paid_plan**: status = active and plan ∈ {premium, student, basic}
//!
//! The three booleans only exist inside [`EntitlementSnapshot`], whose sole
//! constructor computes all of them from one `(plan, status)` pair.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Subscription plan tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Basic,
    Student,
    Premium,
}

impl Plan {
    pub const ALL: [Plan; 4] = [Self::Free, Self::Basic, Self::Student, Self::Premium];

    /// Wire name, as stored in the entitlement document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Student => "student",
            Self::Premium => "premium",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Self::Free),
            "basic" => Some(Self::Basic),
            "student" => Some(Self::Student),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Basic | Self::Student | Self::Premium)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activation status of the plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    None,
    Inactive,
    Active,
}

impl PlanStatus {
    pub const ALL: [PlanStatus; 3] = [Self::None, Self::Inactive, Self::Active];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Inactive => "inactive",
            Self::Active => "active",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "inactive" => Some(Self::Inactive),
            "active" => Some(Self::Active),
            _ => None,
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `(plan, status)` pair. Default is `free/none`, the most restrictive value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entitlement {
    pub plan: Plan,
    pub status: PlanStatus,
}

impl Entitlement {
    pub fn new(plan: Plan, status: PlanStatus) -> Self {
        Self { plan, status }
    }

    pub fn is_premium_active(&self) -> bool {
        self.plan == Plan::Premium && self.status == PlanStatus::Active
    }

    pub fn is_student_active(&self) -> bool {
        self.plan == Plan::Student && self.status == PlanStatus::Active
    }

    pub fn has_any_paid_plan(&self) -> bool {
        self.status == PlanStatus::Active && self.plan.is_paid()
    }
}

/// Read-only snapshot published by the entitlement mirror.
///
/// Fields are private: the only way to obtain one is from an [`Entitlement`],
/// so the booleans always agree with the pair that produced them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct EntitlementSnapshot {
    plan: Plan,
    status: PlanStatus,
    is_premium_active: bool,
    is_student_active: bool,
    has_any_paid_plan: bool,
}

impl From<Entitlement> for EntitlementSnapshot {
    fn from(e: Entitlement) -> Self {
        Self {
            plan: e.plan,
            status: e.status,
            is_premium_active: e.is_premium_active(),
            is_student_active: e.is_student_active(),
            has_any_paid_plan: e.has_any_paid_plan(),
        }
    }
}

impl EntitlementSnapshot {
    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn status(&self) -> PlanStatus {
        self.status
    }

    pub fn entitlement(&self) -> Entitlement {
        Entitlement::new(self.plan, self.status)
    }

    pub fn is_premium_active(&self) -> bool {
        self.is_premium_active
    }

    pub fn is_student_active(&self) -> bool {
        self.is_student_active
    }

    pub fn has_any_paid_plan(&self) -> bool {
        self.has_any_paid_plan
    }
}

/// What the mirror currently knows.
///
/// `Loading` carries no plan data at all, so a half-loaded state mixing
/// defaults and real fields cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementState {
    Loading,
    Loaded(EntitlementSnapshot),
}

impl EntitlementState {
    /// The state published when no user is signed in: loaded, `free/none`.
    pub fn signed_out() -> Self {
        Self::Loaded(EntitlementSnapshot::default())
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn snapshot(&self) -> Option<&EntitlementSnapshot> {
        match self {
            Self::Loading => None,
            Self::Loaded(snapshot) => Some(snapshot),
        }
    }

    /// Current plan; `free` while loading.
    pub fn plan(&self) -> Plan {
        self.snapshot().map(|s| s.plan()).unwrap_or_default()
    }

    /// Current status; `none` while loading.
    pub fn status(&self) -> PlanStatus {
        self.snapshot().map(|s| s.status()).unwrap_or_default()
    }

    pub fn is_premium_active(&self) -> bool {
        self.snapshot().is_some_and(|s| s.is_premium_active())
    }

    pub fn is_student_active(&self) -> bool {
        self.snapshot().is_some_and(|s| s.is_student_active())
    }

    pub fn has_any_paid_plan(&self) -> bool {
        self.snapshot().is_some_and(|s| s.has_any_paid_plan())
    }
}

/// Entitlement document as held by the authoritative store for one uid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementDoc {
    pub plan: Plan,
    pub plan_status: PlanStatus,
    pub plan_expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl EntitlementDoc {
    pub fn new(plan: Plan, plan_status: PlanStatus) -> Self {
        Self {
            plan,
            plan_status,
            plan_expires_at: None,
            updated_at: Utc::now(),
        }
    }

    /// Decode raw stored values. Missing or unrecognised values fall back to
    /// `free` / `none` so a malformed document never grants access.
    pub fn from_raw(
        plan: Option<&str>,
        plan_status: Option<&str>,
        plan_expires_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let plan = match plan {
            None => Plan::Free,
            Some(raw) => Plan::parse(raw).unwrap_or_else(|| {
                warn!(plan = raw, "Unknown plan in entitlement document, treating as free");
                Plan::Free
            }),
        };
        let plan_status = match plan_status {
            None => PlanStatus::None,
            Some(raw) => PlanStatus::parse(raw).unwrap_or_else(|| {
                warn!(status = raw, "Unknown plan status in entitlement document, treating as none");
                PlanStatus::None
            }),
        };
        Self {
            plan,
            plan_status,
            plan_expires_at,
            updated_at,
        }
    }

    pub fn entitlement(&self) -> Entitlement {
        Entitlement::new(self.plan, self.plan_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_free_none() {
        let snap = EntitlementSnapshot::default();
        assert_eq!(snap.plan(), Plan::Free);
        assert_eq!(snap.status(), PlanStatus::None);
        assert!(!snap.is_premium_active());
        assert!(!snap.is_student_active());
        assert!(!snap.has_any_paid_plan());
    }

    #[test]
    fn test_snapshot_booleans_follow_pair() {
        let snap = EntitlementSnapshot::from(Entitlement::new(Plan::Basic, PlanStatus::Active));
        assert!(snap.has_any_paid_plan());
        assert!(!snap.is_premium_active());
        assert!(!snap.is_student_active());

        let snap = EntitlementSnapshot::from(Entitlement::new(Plan::Premium, PlanStatus::Inactive));
        assert!(!snap.is_premium_active());
        assert!(!snap.has_any_paid_plan());
    }

    #[test]
    fn test_plan_str_roundtrip() {
        for plan in Plan::ALL {
            assert_eq!(Plan::parse(plan.as_str()), Some(plan));
        }
        for status in PlanStatus::ALL {
            assert_eq!(PlanStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_loading_state_exposes_nothing() {
        let state = EntitlementState::Loading;
        assert!(state.is_loading());
        assert!(state.snapshot().is_none());
        assert_eq!(state.plan(), Plan::Free);
        assert!(!state.has_any_paid_plan());
    }

    #[test]
    fn test_from_raw_unknown_values_are_restrictive() {
        let doc = EntitlementDoc::from_raw(Some("platinum"), Some("trialing"), None, Utc::now());
        assert_eq!(doc.entitlement(), Entitlement::default());
    }

    #[test]
    fn test_from_raw_missing_fields() {
        let doc = EntitlementDoc::from_raw(Some("premium"), None, None, Utc::now());
        assert_eq!(doc.plan, Plan::Premium);
        assert_eq!(doc.plan_status, PlanStatus::None);
        assert!(!doc.entitlement().is_premium_active());
    }
}
