//! EntitlementMirror: one subscription per session, one published state.
//!
//! ## Apply protocol
//! Deliveries are applied by a single task per subscription, in arrival
//! order. Each apply happens under `gate`, and only if the task's generation
//! still matches. `detach()` bumps the generation under the same lock, so
//! once it returns no delivery from the old subscription can touch state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nichiboku_core::errors::{ErrorCode, SyncError};
use nichiboku_core::traits::{EntitlementUpdate, IEntitlementSource};
use nichiboku_core::types::{EntitlementSnapshot, EntitlementState, Session, Uid};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct Shared {
    gate: Mutex<u64>,
    tx: watch::Sender<EntitlementState>,
}

impl Shared {
    fn lock_gate(&self) -> MutexGuard<'_, u64> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, next: EntitlementState) {
        self.tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    /// Apply one delivery. Returns `false` once the subscription is stale.
    fn apply(&self, generation: u64, uid: &Uid, update: EntitlementUpdate) -> bool {
        let gate = self.lock_gate();
        if *gate != generation {
            debug!(uid = %uid, "Dropping delivery for a detached subscription");
            return false;
        }
        match update {
            Ok(doc) => {
                let snapshot = doc
                    .map(|d| EntitlementSnapshot::from(d.entitlement()))
                    .unwrap_or_default();
                info!(
                    uid = %uid,
                    plan = %snapshot.plan(),
                    status = %snapshot.status(),
                    "Entitlement snapshot applied"
                );
                self.publish(EntitlementState::Loaded(snapshot));
            }
            Err(e) => {
                let err = SyncError::Subscription {
                    uid: uid.to_string(),
                    reason: e.to_string(),
                };
                warn!(
                    uid = %uid,
                    code = err.error_code(),
                    error = %err,
                    "Entitlement listener failed, keeping last snapshot"
                );
                self.stop_loading();
            }
        }
        drop(gate);
        true
    }

    /// Feed ended. Same as a listener error: keep what we have.
    fn close(&self, generation: u64, uid: &Uid) {
        let gate = self.lock_gate();
        if *gate == generation {
            warn!(uid = %uid, "Entitlement feed closed, keeping last snapshot");
            self.stop_loading();
        }
        drop(gate);
    }

    fn stop_loading(&self) {
        self.tx.send_if_modified(|current| {
            if current.is_loading() {
                *current = EntitlementState::signed_out();
                true
            } else {
                false
            }
        });
    }
}

/// Mirrors the entitlement document of the attached session.
///
/// Attaching spawns a Tokio task and must happen inside a runtime.
pub struct EntitlementMirror<S> {
    source: Arc<S>,
    shared: Arc<Shared>,
    task: Mutex<Option<(Uid, JoinHandle<()>)>>,
}

impl<S: IEntitlementSource> EntitlementMirror<S> {
    pub fn new(source: Arc<S>) -> Self {
        let (tx, _) = watch::channel(EntitlementState::signed_out());
        Self {
            source,
            shared: Arc::new(Shared {
                gate: Mutex::new(0),
                tx,
            }),
            task: Mutex::new(None),
        }
    }

    /// Start mirroring `session`. Any previous subscription is torn down
    /// first; the state reads `Loading` until the first delivery.
    pub fn attach(&self, session: &Session) {
        self.detach();

        let generation = {
            let mut gate = self.shared.lock_gate();
            *gate += 1;
            self.shared.publish(EntitlementState::Loading);
            *gate
        };

        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.shared);
        let uid = session.uid.clone();
        let task_uid = uid.clone();
        let handle = tokio::spawn(async move {
            let mut feed = source.subscribe(&task_uid).await;
            while let Some(update) = feed.recv().await {
                if !shared.apply(generation, &task_uid, update) {
                    return;
                }
            }
            shared.close(generation, &task_uid);
        });

        info!(uid = %uid, "Entitlement mirror attached");
        *self.lock_task() = Some((uid, handle));
    }

    /// Stop mirroring and reset to `Loaded(free/none)`. Synchronous: after
    /// this returns, no delivery from the old subscription is applied.
    pub fn detach(&self) {
        {
            let mut gate = self.shared.lock_gate();
            *gate += 1;
            self.shared.publish(EntitlementState::signed_out());
        }
        if let Some((uid, handle)) = self.lock_task().take() {
            handle.abort();
            info!(uid = %uid, "Entitlement mirror detached");
        }
    }

    pub fn state(&self) -> EntitlementState {
        *self.shared.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<EntitlementState> {
        self.shared.tx.subscribe()
    }

    pub fn attached_uid(&self) -> Option<Uid> {
        self.lock_task().as_ref().map(|(uid, _)| uid.clone())
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<(Uid, JoinHandle<()>)>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> Drop for EntitlementMirror<S> {
    fn drop(&mut self) {
        let task = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((_, handle)) = task {
            handle.abort();
        }
    }
}
