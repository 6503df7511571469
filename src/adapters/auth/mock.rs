//! Mock authentication adapter for testing.
//!
//! Implements the `AuthProvider` port in memory, avoiding the need for a real
//! auth service like Supabase. Registered users sign in with their password;
//! every session change is broadcast to subscribers like the real provider.
//!
//! # Example
//!
//! ```ignore
//! use movie_collection::adapters::auth::MockAuthProvider;
//!
//! let provider = MockAuthProvider::new()
//!     .with_user("user-1", "a@example.com", "secret1")
//!     .signed_in_as("user-1");
//!
//! let mut events = provider.on_auth_state_change();
//! provider.sign_out().await?;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::auth::{AuthChangeEvent, AuthError, AuthSession, Credentials, Identity};
use crate::domain::foundation::UserId;
use crate::ports::{AuthListeners, AuthProvider, AuthSubscription};

#[derive(Debug, Clone)]
struct MockUser {
    identity: Identity,
    password: String,
}

/// Mock auth provider for testing.
///
/// Users are keyed by email. Unknown emails or wrong passwords are rejected
/// with the same message the hosted service uses.
#[derive(Debug, Default)]
pub struct MockAuthProvider {
    /// Registered users by email
    users: RwLock<HashMap<String, MockUser>>,
    /// Current session
    session: RwLock<Option<AuthSession>>,
    /// Subscribers to auth changes
    listeners: Arc<AuthListeners>,
    /// Optional error to return for all operations (for error testing)
    force_error: RwLock<Option<AuthError>>,
    /// When set, sign-up succeeds without signing in
    require_confirmation: RwLock<bool>,
}

impl MockAuthProvider {
    /// Creates a new empty mock provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user.
    pub fn with_user(
        self,
        user_id: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.add_user(user_id, email, password);
        self
    }

    /// Starts with a session for a registered user.
    ///
    /// Unknown ids leave the provider signed out.
    pub fn signed_in_as(self, user_id: &str) -> Self {
        let identity = read(&self.users)
            .values()
            .find(|user| user.identity.id.as_str() == user_id)
            .map(|user| user.identity.clone());
        *write(&self.session) = identity.map(session_for);
        self
    }

    /// Forces all operations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *write(&self.force_error) = Some(error);
        self
    }

    /// Makes sign-up wait for email confirmation instead of signing in.
    pub fn requiring_confirmation(self) -> Self {
        *write(&self.require_confirmation) = true;
        self
    }

    /// Clears the forced error.
    pub fn clear_error(&self) {
        *write(&self.force_error) = None;
    }

    /// Registers a user at runtime.
    pub fn add_user(
        &self,
        user_id: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) {
        let email = email.into();
        let Ok(user_id) = UserId::new(user_id) else {
            tracing::warn!(%email, "Ignoring mock user without an id");
            return;
        };
        let user = MockUser {
            identity: Identity::new(user_id, email.clone()),
            password: password.into(),
        };
        write(&self.users).insert(email, user);
    }

    /// Broadcasts an arbitrary event without touching the session.
    ///
    /// Useful for duplicate or out-of-band notifications.
    pub fn emit(&self, event: AuthChangeEvent) {
        self.listeners.emit(event);
    }

    /// Replaces the session and broadcasts the matching event.
    pub fn switch_to(&self, user_id: &str) {
        let identity = read(&self.users)
            .values()
            .find(|user| user.identity.id.as_str() == user_id)
            .map(|user| user.identity.clone());
        match identity {
            Some(identity) => self.establish(session_for(identity)),
            None => self.end_session(),
        }
    }

    /// Returns the number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Returns the number of registered users.
    pub fn user_count(&self) -> usize {
        read(&self.users).len()
    }

    fn check_error(&self) -> Result<(), AuthError> {
        match read(&self.force_error).clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn establish(&self, session: AuthSession) {
        *write(&self.session) = Some(session.clone());
        self.listeners.emit(AuthChangeEvent::signed_in(session));
    }

    fn end_session(&self) {
        *write(&self.session) = None;
        self.listeners.emit(AuthChangeEvent::signed_out());
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn get_session(&self) -> Result<Option<AuthSession>, AuthError> {
        self.check_error()?;
        Ok(read(&self.session).clone())
    }

    async fn get_user(&self) -> Result<Option<Identity>, AuthError> {
        self.check_error()?;
        Ok(read(&self.session).as_ref().map(|s| s.identity.clone()))
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<(), AuthError> {
        self.check_error()?;

        let user = read(&self.users).get(credentials.email()).cloned();
        match user {
            Some(user) if user.password == credentials.password() => {
                self.establish(session_for(user.identity));
                Ok(())
            }
            _ => Err(AuthError::rejected("Invalid login credentials")),
        }
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<(), AuthError> {
        self.check_error()?;

        if read(&self.users).contains_key(credentials.email()) {
            return Err(AuthError::rejected("User already registered"));
        }

        let user_id = format!("user-{}", self.user_count() + 1);
        self.add_user(user_id.as_str(), credentials.email(), credentials.password());

        if *read(&self.require_confirmation) {
            return Ok(());
        }
        self.switch_to(&user_id);
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.check_error()?;
        self.end_session();
        Ok(())
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        self.listeners.subscribe()
    }
}

fn session_for(identity: Identity) -> AuthSession {
    let token = format!("mock-token-{}", identity.id);
    AuthSession::new(identity, token)
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials::new(email, password).unwrap()
    }

    fn provider() -> MockAuthProvider {
        MockAuthProvider::new().with_user("user-a", "a@example.com", "secret1")
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Sign in / out
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn sign_in_with_correct_password_emits_signed_in() {
        let provider = provider();
        let mut events = provider.on_auth_state_change();

        provider
            .sign_in_with_password(&credentials("a@example.com", "secret1"))
            .await
            .unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(event.identity().unwrap().id.as_str(), "user-a");
        assert!(provider.get_user().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn sign_in_with_wrong_password_is_rejected() {
        let provider = provider();
        let mut events = provider.on_auth_state_change();

        let result = provider
            .sign_in_with_password(&credentials("a@example.com", "wrong-pass"))
            .await;

        assert_eq!(result, Err(AuthError::rejected("Invalid login credentials")));
        assert!(events.try_recv().is_none());
    }

    #[tokio::test]
    async fn sign_out_emits_signed_out() {
        let provider = provider().signed_in_as("user-a");
        let mut events = provider.on_auth_state_change();

        provider.sign_out().await.unwrap();

        assert!(events.recv().await.unwrap().kind.is_sign_out());
        assert!(provider.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn signed_in_as_restores_session_without_event() {
        let provider = provider().signed_in_as("user-a");
        let mut events = provider.on_auth_state_change();

        let session = provider.get_session().await.unwrap().unwrap();

        assert_eq!(session.identity.email, "a@example.com");
        assert!(events.try_recv().is_none());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Sign up
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn sign_up_registers_and_signs_in() {
        let provider = MockAuthProvider::new();
        let mut events = provider.on_auth_state_change();

        provider
            .sign_up(&credentials("new@example.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(provider.user_count(), 1);
        assert_eq!(events.recv().await.unwrap().identity().unwrap().email, "new@example.com");
    }

    #[tokio::test]
    async fn sign_up_requiring_confirmation_emits_nothing() {
        let provider = MockAuthProvider::new().requiring_confirmation();
        let mut events = provider.on_auth_state_change();

        provider
            .sign_up(&credentials("new@example.com", "secret1"))
            .await
            .unwrap();

        assert!(events.try_recv().is_none());
        assert!(provider.get_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sign_up_existing_email_is_rejected() {
        let provider = provider();

        let result = provider.sign_up(&credentials("a@example.com", "secret1")).await;

        assert_eq!(result, Err(AuthError::rejected("User already registered")));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error injection
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn forced_error_applies_until_cleared() {
        let provider = provider().with_error(AuthError::service_unavailable("down"));

        assert!(provider.get_session().await.is_err());
        assert!(provider.sign_out().await.is_err());

        provider.clear_error();
        assert!(provider.get_session().await.is_ok());
    }

    #[test]
    fn subscriber_count_tracks_live_subscriptions() {
        let provider = provider();
        let subscription = provider.on_auth_state_change();
        assert_eq!(provider.subscriber_count(), 1);

        drop(subscription);

        assert_eq!(provider.subscriber_count(), 0);
    }
}
