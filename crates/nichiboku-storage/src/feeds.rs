//! Live entitlement feed registry: uid → open subscriber channels.

use dashmap::DashMap;
use nichiboku_core::traits::EntitlementUpdate;
use nichiboku_core::types::Uid;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Default)]
pub struct FeedRegistry {
    feeds: DashMap<String, Vec<UnboundedSender<EntitlementUpdate>>>,
}

impl FeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber for `uid`, dropping any channels already closed.
    pub fn register(&self, uid: &Uid, tx: UnboundedSender<EntitlementUpdate>) {
        let mut senders = self.feeds.entry(uid.as_str().to_string()).or_default();
        senders.retain(|sender| !sender.is_closed());
        senders.push(tx);
    }

    /// Deliver `update` to every live subscriber of `uid`, dropping closed
    /// channels. Returns the number of deliveries.
    pub fn publish(&self, uid: &Uid, update: &EntitlementUpdate) -> usize {
        let delivered = match self.feeds.get_mut(uid.as_str()) {
            Some(mut senders) => {
                senders.retain(|tx| tx.send(update.clone()).is_ok());
                senders.len()
            }
            None => return 0,
        };
        if delivered == 0 {
            self.feeds.remove_if(uid.as_str(), |_, senders| senders.is_empty());
        }
        delivered
    }

    pub fn subscriber_count(&self, uid: &Uid) -> usize {
        self.feeds
            .get(uid.as_str())
            .map(|senders| senders.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }
}
