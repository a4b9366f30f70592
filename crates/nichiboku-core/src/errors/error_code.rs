//! Stable string error codes, used in logs and by host bindings.

pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const DB_BUSY: &str = "DB_BUSY";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
pub const IDENTITY_UNAVAILABLE: &str = "IDENTITY_UNAVAILABLE";
pub const SUBSCRIPTION_ERROR: &str = "SUBSCRIPTION_ERROR";
pub const AWARD_WRITE_ERROR: &str = "AWARD_WRITE_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";

/// Implemented by every error enum in the workspace.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}
