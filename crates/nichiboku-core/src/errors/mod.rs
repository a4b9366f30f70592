//! Error types for every layer of the account core (thiserror).

pub mod error_code;
mod recovery;
mod storage_error;
mod sync_error;

pub use error_code::ErrorCode;
pub use recovery::RecoveryAction;
pub use storage_error::{StorageError, StorageResult};
pub use sync_error::{SyncError, SyncResult};
