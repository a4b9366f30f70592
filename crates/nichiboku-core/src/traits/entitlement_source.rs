//! `IEntitlementSource`: live subscription to one user's entitlement document.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::errors::StorageResult;
use crate::types::{EntitlementDoc, Uid};

/// One delivery on a feed. `Ok(None)` means the document does not exist.
pub type EntitlementUpdate = StorageResult<Option<EntitlementDoc>>;

/// Receiving half of a live subscription. Dropping it unsubscribes.
pub type EntitlementFeed = mpsc::UnboundedReceiver<EntitlementUpdate>;

pub trait IEntitlementSource: Send + Sync + 'static {
    /// Open a feed for `uid`.
    ///
    /// The first delivery is the document as it is now; later deliveries are
    /// complete documents in commit order. An `Err` delivery is a transient
    /// listener failure, not the end of the feed.
    fn subscribe(&self, uid: &Uid) -> impl Future<Output = EntitlementFeed> + Send;
}

impl<T: IEntitlementSource> IEntitlementSource for Arc<T> {
    fn subscribe(&self, uid: &Uid) -> impl Future<Output = EntitlementFeed> + Send {
        (**self).subscribe(uid)
    }
}
