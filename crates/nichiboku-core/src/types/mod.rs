//! Shared data structures for sessions, entitlements and progress.

pub mod entitlement;
pub mod identifiers;
pub mod progress;
pub mod session;

pub use entitlement::{Entitlement, EntitlementDoc, EntitlementSnapshot, EntitlementState, Plan, PlanStatus};
pub use identifiers::{AchievementId, ScreenKey, Uid};
pub use progress::{
    AchievementAward, AchievementGrant, AchievementRecord, EnterAward, EntryRecord, SuccessAward,
    SuccessRecord, UserEvent, UserEventType, XpTotals,
};
pub use session::{IdentityEvent, Session};
