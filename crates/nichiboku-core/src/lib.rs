//! # nichiboku-core
//!
//! Foundation crate for the Nichiboku account core.
//! Defines the session, entitlement and progress types, the store traits,
//! errors, config, tracing setup, and the screen award catalog.
//! Every other crate in the workspace depends on this.

pub mod awards;
pub mod config;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::NichibokuConfig;
pub use errors::error_code::ErrorCode;
pub use errors::{StorageError, StorageResult, SyncError, SyncResult};
pub use types::entitlement::{Entitlement, EntitlementSnapshot, EntitlementState, Plan, PlanStatus};
pub use types::identifiers::{AchievementId, ScreenKey, Uid};
pub use types::session::{IdentityEvent, Session};
