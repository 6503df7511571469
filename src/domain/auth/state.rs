//! Authentication state machine.
//!
//! ```text
//!                 resolve(None)            change(Some)
//! Uninitialized ───────────────▶ Absent ◀──────────────▶ Present ─┐
//!       │                                  change(None)    ▲      │ change(Some other)
//!       └──────────────────────────────────────────────────┘      │
//!                 resolve(Some)                             └──────┘
//! ```
//!
//! `loading` is a one-way latch: true until the first resolution, false
//! forever after, regardless of later transitions.

use super::{AuthSession, Identity};

/// Coarse lifecycle phase of the auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Initial probe has not completed.
    Uninitialized,
    /// Resolved, nobody signed in.
    ResolvedAbsent,
    /// Resolved, an identity is signed in.
    ResolvedPresent,
}

/// How an identity change relates to the identity before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityTransition {
    SignedIn,
    SignedOut,
    Switched,
    Unchanged,
}

impl IdentityTransition {
    /// Classifies a change from `previous` to `next` by user id.
    pub fn between(previous: Option<&Identity>, next: Option<&Identity>) -> Self {
        match (previous, next) {
            (None, Some(_)) => IdentityTransition::SignedIn,
            (Some(_), None) => IdentityTransition::SignedOut,
            (Some(prev), Some(next)) if prev.id != next.id => IdentityTransition::Switched,
            _ => IdentityTransition::Unchanged,
        }
    }
}

/// Current authentication state: loading latch plus the session, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    loading: bool,
    session: Option<AuthSession>,
}

impl AuthState {
    /// Creates the uninitialized state (loading, no identity).
    pub fn new() -> Self {
        Self {
            loading: true,
            session: None,
        }
    }

    /// Creates an already-resolved state.
    pub fn resolved(session: Option<AuthSession>) -> Self {
        Self {
            loading: false,
            session,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.session.as_ref().map(|session| &session.identity)
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.loading, &self.session) {
            (true, _) => SessionPhase::Uninitialized,
            (false, None) => SessionPhase::ResolvedAbsent,
            (false, Some(_)) => SessionPhase::ResolvedPresent,
        }
    }

    /// Records the outcome of the initial session probe and releases the latch.
    pub fn resolve(&mut self, session: Option<AuthSession>) -> IdentityTransition {
        self.loading = false;
        self.replace_session(session)
    }

    /// Applies an identity-change notification. Does not touch the latch.
    pub fn apply_change(&mut self, session: Option<AuthSession>) -> IdentityTransition {
        self.replace_session(session)
    }

    fn replace_session(&mut self, session: Option<AuthSession>) -> IdentityTransition {
        let transition = IdentityTransition::between(self.identity(), session.as_ref().map(|s| &s.identity));
        self.session = session;
        transition
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}
