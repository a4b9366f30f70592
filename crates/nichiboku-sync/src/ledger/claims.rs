//! ClaimSet: per-scope in-flight tracking for award keys.
//!
//! `try_claim` marks a key in flight atomically and hands back a guard. A
//! guard dropped without `settle()` releases the key so a later trigger can
//! retry; a settled key stays claimed for the lifetime of the set.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Why a claim was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claimed {
    InFlight,
    Settled,
}

#[derive(Debug, Clone, Default)]
pub struct ClaimSet {
    keys: Arc<DashMap<String, Claimed>>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_claim(&self, key: &str) -> Result<ClaimGuard, Claimed> {
        match self.keys.entry(key.to_string()) {
            Entry::Occupied(existing) => Err(*existing.get()),
            Entry::Vacant(slot) => {
                slot.insert(Claimed::InFlight);
                Ok(ClaimGuard {
                    key: key.to_string(),
                    keys: Arc::clone(&self.keys),
                    settled: false,
                })
            }
        }
    }

    pub fn state(&self, key: &str) -> Option<Claimed> {
        self.keys.get(key).map(|v| *v)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[must_use = "dropping the guard releases the claim"]
#[derive(Debug)]
pub struct ClaimGuard {
    key: String,
    keys: Arc<DashMap<String, Claimed>>,
    settled: bool,
}

impl ClaimGuard {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Keep the key claimed for good.
    pub fn settle(mut self) {
        self.keys.insert(self.key.clone(), Claimed::Settled);
        self.settled = true;
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.keys.remove(&self.key);
        }
    }
}
