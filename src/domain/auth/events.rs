//! Identity-change notifications emitted by auth providers.

use serde::{Deserialize, Serialize};

use super::{AuthSession, Identity};

/// Kind of auth state change.
///
/// Only `SignedOut` carries special meaning downstream; every other kind is
/// treated generically by looking at the session it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventKind {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

impl AuthEventKind {
    pub fn is_sign_out(&self) -> bool {
        matches!(self, AuthEventKind::SignedOut)
    }
}

/// An auth state change: what happened and the session afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChangeEvent {
    pub kind: AuthEventKind,
    pub session: Option<AuthSession>,
}

impl AuthChangeEvent {
    pub fn new(kind: AuthEventKind, session: Option<AuthSession>) -> Self {
        Self { kind, session }
    }

    pub fn signed_in(session: AuthSession) -> Self {
        Self::new(AuthEventKind::SignedIn, Some(session))
    }

    pub fn signed_out() -> Self {
        Self::new(AuthEventKind::SignedOut, None)
    }

    /// Identity after this change. A sign-out never carries one, even if a
    /// provider attached a stale session to the event.
    pub fn identity(&self) -> Option<&Identity> {
        if self.kind.is_sign_out() {
            return None;
        }
        self.session.as_ref().map(|session| &session.identity)
    }
}
