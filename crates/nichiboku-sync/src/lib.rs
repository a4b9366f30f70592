//! # nichiboku-sync
//!
//! Keeps a signed-in learner's view of their account consistent with the
//! authoritative store:
//!
//! - [`SessionWatcher`]: the current session as a live value.
//! - [`EntitlementMirror`]: live, read-only copy of the user's plan.
//! - [`ProgressLedger`] / [`ScreenScope`]: at-most-once XP and achievement awards.
//! - [`AccessGate`]: plan-based access decisions for premium content.
//!
//! [`AccountService`] wires the four together around one store.

pub mod account;
pub mod entitlement;
pub mod gate;
pub mod ledger;
pub mod session;

pub use account::AccountService;
pub use entitlement::EntitlementMirror;
pub use gate::{has_access, AccessGate, BlockedNotice, GateDecision, GateView, Requirement};
pub use ledger::{AwardOutcome, ClaimSet, EnterOutcome, ProgressLedger, ScreenScope, SkipReason};
pub use session::SessionWatcher;
