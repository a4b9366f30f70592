//! SessionWatcher: the signed-in session as a single live value.

use nichiboku_core::errors::{ErrorCode, SyncError};
use nichiboku_core::types::{IdentityEvent, Session, Uid};
use tokio::sync::watch;
use tracing::{info, warn};

/// Publishes `Option<Session>` to any number of readers. Every transition
/// replaces the whole value.
pub struct SessionWatcher {
    tx: watch::Sender<Option<Session>>,
}

impl SessionWatcher {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Apply an identity transition. Returns `true` if the session changed.
    pub fn apply(&self, event: IdentityEvent) -> bool {
        let next = event.into_session();
        match &next {
            Some(session) => info!(uid = %session.uid, "Session signed in"),
            None => info!("Session signed out"),
        }
        self.tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        })
    }

    /// An identity stream failure is treated as sign-out.
    pub fn apply_error(&self, error: &SyncError) -> bool {
        warn!(
            code = error.error_code(),
            error = %error,
            "Identity stream failed, treating as sign-out"
        );
        self.apply(IdentityEvent::SignedOut)
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn uid(&self) -> Option<Uid> {
        self.tx.borrow().as_ref().map(|s| s.uid.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}

impl Default for SessionWatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_signed_out() {
        let watcher = SessionWatcher::new();
        assert!(watcher.current().is_none());
    }

    #[test]
    fn test_sign_in_then_out() {
        let watcher = SessionWatcher::new();
        let rx = watcher.subscribe();

        assert!(watcher.apply(IdentityEvent::signed_in("u1", Some("a@b.mx"))));
        assert_eq!(rx.borrow().as_ref().unwrap().uid.as_str(), "u1");
        assert_eq!(watcher.uid().unwrap().as_str(), "u1");

        assert!(watcher.apply(IdentityEvent::SignedOut));
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn test_repeated_transition_is_not_a_change() {
        let watcher = SessionWatcher::new();
        assert!(watcher.apply(IdentityEvent::signed_in("u1", None)));
        assert!(!watcher.apply(IdentityEvent::signed_in("u1", None)));
        assert!(watcher.apply(IdentityEvent::SignedOut));
        assert!(!watcher.apply(IdentityEvent::SignedOut));
    }

    #[test]
    fn test_error_signs_out() {
        let watcher = SessionWatcher::new();
        watcher.apply(IdentityEvent::signed_in("u1", None));
        assert!(watcher.apply_error(&SyncError::IdentityUnavailable));
        assert!(watcher.current().is_none());
    }
}
