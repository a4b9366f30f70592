//! Identity-provider session and its transitions.

use serde::{Deserialize, Serialize};

use super::identifiers::Uid;

/// The signed-in user. Replaced wholesale on every auth transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub uid: Uid,
    pub email: Option<String>,
}

impl Session {
    pub fn new(uid: impl Into<Uid>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            email,
        }
    }
}

/// A transition emitted by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    SignedIn { uid: Uid, email: Option<String> },
    SignedOut,
}

impl IdentityEvent {
    pub fn signed_in(uid: impl Into<Uid>, email: Option<&str>) -> Self {
        Self::SignedIn {
            uid: uid.into(),
            email: email.map(str::to_string),
        }
    }

    /// The session this transition leads to. `None` for sign-out.
    pub fn into_session(self) -> Option<Session> {
        match self {
            Self::SignedIn { uid, email } => Some(Session { uid, email }),
            Self::SignedOut => None,
        }
    }
}
