//! Top-level error for the synchronization core.

use super::error_code::{self, ErrorCode};
use super::StorageError;

/// Error taxonomy of the sync core. None of these reach a lesson screen:
/// the sync crate logs them and degrades to "no state change".
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("No signed-in session")]
    IdentityUnavailable,

    #[error("Entitlement subscription failed for {uid}: {reason}")]
    Subscription { uid: String, reason: String },

    #[error("Award write failed: {0}")]
    AwardWrite(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ErrorCode for SyncError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::IdentityUnavailable => error_code::IDENTITY_UNAVAILABLE,
            Self::Subscription { .. } => error_code::SUBSCRIPTION_ERROR,
            Self::AwardWrite(StorageError::DbBusy) => error_code::DB_BUSY,
            Self::AwardWrite(_) => error_code::AWARD_WRITE_ERROR,
            Self::Configuration(_) => error_code::CONFIG_ERROR,
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
