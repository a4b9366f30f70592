//! AccountService: one store, one session, one mirror, handed out to screens
//! as ledgers, scopes and gates.

use std::sync::Arc;

use nichiboku_core::awards::AwardCatalog;
use nichiboku_core::config::NichibokuConfig;
use nichiboku_core::errors::{SyncError, SyncResult};
use nichiboku_core::traits::{IEntitlementSource, IProgressStore};
use nichiboku_core::types::{EntitlementState, IdentityEvent, ScreenKey, Session};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::entitlement::EntitlementMirror;
use crate::gate::{AccessGate, Requirement};
use crate::ledger::{ProgressLedger, ScreenScope};
use crate::session::SessionWatcher;

pub struct AccountService<S> {
    store: Arc<S>,
    config: NichibokuConfig,
    catalog: Arc<AwardCatalog>,
    session: SessionWatcher,
    mirror: EntitlementMirror<S>,
}

impl<S> AccountService<S>
where
    S: IEntitlementSource + IProgressStore,
{
    pub fn new(store: Arc<S>, config: NichibokuConfig) -> SyncResult<Self> {
        config.validate()?;
        let catalog = Arc::new(AwardCatalog::from_config(&config.awards)?);
        Ok(Self {
            mirror: EntitlementMirror::new(Arc::clone(&store)),
            store,
            config,
            catalog,
            session: SessionWatcher::new(),
        })
    }

    /// Apply an identity transition.
    ///
    /// The mirror is always detached before a new session value is
    /// published, so no reader sees the previous user's plan next to a
    /// different (or absent) session. Must be called inside a Tokio runtime.
    pub fn handle_identity(&self, event: IdentityEvent) {
        match event.clone().into_session() {
            None => {
                self.mirror.detach();
                self.session.apply(event);
            }
            Some(next) => {
                if self.mirror.attached_uid().as_ref() == Some(&next.uid) {
                    debug!(uid = %next.uid, "Same user signed in again, keeping subscription");
                    self.session.apply(event);
                    return;
                }
                self.mirror.detach();
                self.session.apply(event);
                self.mirror.attach(&next);
            }
        }
    }

    /// An identity stream failure signs the user out.
    pub fn handle_identity_error(&self, error: &SyncError) {
        self.mirror.detach();
        self.session.apply_error(error);
    }

    /// Drive the service from an identity stream until it closes.
    pub async fn run_identity(&self, mut events: mpsc::Receiver<SyncResult<IdentityEvent>>) {
        while let Some(item) = events.recv().await {
            match item {
                Ok(event) => self.handle_identity(event),
                Err(e) => self.handle_identity_error(&e),
            }
        }
        info!("Identity stream closed");
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session.current()
    }

    pub fn session(&self) -> &SessionWatcher {
        &self.session
    }

    pub fn entitlement(&self) -> EntitlementState {
        self.mirror.state()
    }

    pub fn mirror(&self) -> &EntitlementMirror<S> {
        &self.mirror
    }

    pub fn gate(&self, required: Requirement) -> AccessGate {
        AccessGate::new(required, self.mirror.subscribe(), self.config.gate.clone())
    }

    pub fn ledger(&self) -> ProgressLedger<S> {
        ProgressLedger::new(Arc::clone(&self.store), self.session.subscribe())
    }

    /// A fresh scope for one mounted screen.
    pub fn scope(&self, screen_key: impl Into<ScreenKey>) -> ScreenScope<S> {
        ScreenScope::new(self.ledger(), screen_key.into(), Arc::clone(&self.catalog))
    }

    pub fn catalog(&self) -> &AwardCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &NichibokuConfig {
        &self.config
    }

    /// Sign out and stop all subscriptions.
    pub fn shutdown(&self) {
        self.handle_identity(IdentityEvent::SignedOut);
        info!("Account service shut down");
    }
}
