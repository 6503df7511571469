//! SessionManager - owns the authentication state.
//!
//! Probes the provider for an existing session once, then follows the
//! provider's change notifications. Consumers pull [`SessionEvent`]s from the
//! [`SessionEvents`] stream returned by [`SessionManager::initialize`]; the
//! shared [`AuthState`] is updated as each event is taken, so readers always
//! see the state matching the last event processed.

use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use crate::domain::auth::{
    AuthChangeEvent, AuthError, AuthEventKind, AuthState, Credentials, Identity,
    IdentityTransition,
};
use crate::ports::{AuthProvider, AuthSubscription};

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Authentication is not configured")]
    NotConfigured,
}

/// What the session manager reports to its consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Outcome of the initial session probe. Always the first event.
    Resolved(Option<Identity>),

    /// An identity-change notification from the provider.
    Changed {
        kind: AuthEventKind,
        identity: Option<Identity>,
    },
}

impl SessionEvent {
    /// Identity after this event.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionEvent::Resolved(identity) => identity.as_ref(),
            SessionEvent::Changed { identity, .. } => identity.as_ref(),
        }
    }
}

/// Owns auth state and exposes sign-in, sign-up and sign-out.
pub struct SessionManager {
    provider: Option<Arc<dyn AuthProvider>>,
    state: Arc<RwLock<AuthState>>,
}

impl SessionManager {
    /// Creates a manager backed by an auth provider. Starts loading.
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider: Some(provider),
            state: Arc::new(RwLock::new(AuthState::new())),
        }
    }

    /// Creates a manager with no auth backend. Starts resolved with no identity.
    pub fn unconfigured() -> Self {
        Self {
            provider: None,
            state: Arc::new(RwLock::new(AuthState::resolved(None))),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// True only until the initial session probe completes.
    pub fn is_loading(&self) -> bool {
        self.read_state().is_loading()
    }

    /// Current identity, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.read_state().identity().cloned()
    }

    /// Copy of the current auth state.
    pub fn state(&self) -> AuthState {
        self.read_state().clone()
    }

    /// Subscribes to changes, then probes for an existing session.
    ///
    /// Subscribing first means no change between the probe and the first
    /// `next()` is lost. A failed probe resolves as signed out.
    pub async fn initialize(&self) -> SessionEvents {
        let Some(provider) = &self.provider else {
            tracing::debug!("No auth provider configured, session resolved as absent");
            return SessionEvents {
                state: Arc::clone(&self.state),
                pending: Some(SessionEvent::Resolved(None)),
                subscription: None,
            };
        };

        let subscription = provider.on_auth_state_change();

        let session = match provider.get_session().await {
            Ok(session) => session,
            Err(error) => {
                tracing::warn!(%error, "Session probe failed, continuing signed out");
                None
            }
        };

        let identity = session.as_ref().map(|s| s.identity.clone());
        self.write_state().resolve(session);

        match &identity {
            Some(identity) => tracing::info!(user_id = %identity.id, "Session resolved"),
            None => tracing::info!("Session resolved without identity"),
        }

        SessionEvents {
            state: Arc::clone(&self.state),
            pending: Some(SessionEvent::Resolved(identity)),
            subscription: Some(subscription),
        }
    }

    /// Signs in. Success is observed through the next session event.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` without an auth provider
    /// - `Auth` with the provider's message on rejection
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let provider = self.provider()?;
        let credentials = Credentials::new(email, password).map_err(AuthError::from)?;
        provider.sign_in_with_password(&credentials).await?;
        Ok(())
    }

    /// Registers a new account. The provider may require confirmation before
    /// any session event fires.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let provider = self.provider()?;
        let credentials = Credentials::new(email, password).map_err(AuthError::from)?;
        provider.sign_up(&credentials).await?;
        Ok(())
    }

    /// Signs out. Success is observed through the next session event.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.provider()?.sign_out().await?;
        Ok(())
    }

    fn provider(&self) -> Result<&Arc<dyn AuthProvider>, SessionError> {
        self.provider.as_ref().ok_or(SessionError::NotConfigured)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, AuthState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("configured", &self.is_configured())
            .field("state", &*self.read_state())
            .finish()
    }
}

/// Ordered stream of session events.
///
/// Dropping it releases the underlying auth subscription.
#[derive(Debug)]
pub struct SessionEvents {
    state: Arc<RwLock<AuthState>>,
    pending: Option<SessionEvent>,
    subscription: Option<AuthSubscription>,
}

impl SessionEvents {
    /// Waits for the next event. Returns `None` once the stream is closed.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }
        let change = self.subscription.as_mut()?.recv().await?;
        Some(self.apply(change))
    }

    /// Returns the next event if one is already queued.
    pub fn try_next(&mut self) -> Option<SessionEvent> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }
        let change = self.subscription.as_mut()?.try_recv()?;
        Some(self.apply(change))
    }

    /// Releases the auth subscription. Already-queued events can still be taken.
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.as_mut() {
            subscription.unsubscribe();
        }
    }

    fn apply(&self, change: AuthChangeEvent) -> SessionEvent {
        let session = if change.kind.is_sign_out() {
            None
        } else {
            change.session
        };
        let identity = session.as_ref().map(|s| s.identity.clone());

        let transition = self
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .apply_change(session);

        match (&transition, &identity) {
            (IdentityTransition::Unchanged, _) => {
                tracing::debug!(kind = ?change.kind, "Auth change without identity transition")
            }
            (_, Some(identity)) => {
                tracing::info!(kind = ?change.kind, ?transition, user_id = %identity.id, "Identity changed")
            }
            (_, None) => tracing::info!(kind = ?change.kind, ?transition, "Identity cleared"),
        }

        SessionEvent::Changed {
            kind: change.kind,
            identity,
        }
    }
}
