//! RecoveryAction: what to do when a sync operation fails.

use std::fmt;

use super::{StorageError, SyncError};

/// Recommended recovery action for a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Retry on the next natural trigger (transient failure like SQLITE_BUSY).
    Retry,
    /// Keep serving the last known-good state.
    Fallback,
    /// A caller or configuration bug; must be fixed, not retried.
    Escalate,
    /// Nothing to do; the operation was a no-op.
    Ignore,
}

impl RecoveryAction {
    /// Determine the recommended recovery action for a SyncError.
    pub fn for_error(error: &SyncError) -> Self {
        match error {
            // No session: most restrictive defaults, nothing to retry.
            SyncError::IdentityUnavailable => Self::Ignore,

            // Listener errors keep the last snapshot.
            SyncError::Subscription { .. } => Self::Fallback,

            SyncError::AwardWrite(StorageError::MigrationFailed { .. }) => Self::Escalate,
            SyncError::AwardWrite(StorageError::CorruptRow { .. }) => Self::Escalate,
            SyncError::AwardWrite(_) => Self::Retry,

            SyncError::Configuration(_) => Self::Escalate,
        }
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retry => write!(f, "Retry"),
            Self::Fallback => write!(f, "Fallback"),
            Self::Escalate => write!(f, "Escalate"),
            Self::Ignore => write!(f, "Ignore"),
        }
    }
}
