//! Auth provider port for email/password authentication.
//!
//! This port mirrors what a hosted auth service offers: probe the current
//! session, resolve the current user, sign in, sign up, sign out, and
//! subscribe to auth state changes.
//!
//! # Contract
//!
//! - Successful `sign_in_with_password` and `sign_out` are reported to
//!   subscribers through an [`AuthChangeEvent`], not only through the return
//!   value. `sign_up` may not emit anything when the provider requires email
//!   confirmation first.
//! - Rejections carry the provider's message in `AuthError::Rejected`.
//! - Unreachable providers yield `AuthError::ServiceUnavailable`.
//!
//! [`AuthChangeEvent`]: crate::domain::auth::AuthChangeEvent

use async_trait::async_trait;

use super::AuthSubscription;
use crate::domain::auth::{AuthError, AuthSession, Credentials, Identity};

/// Authenticates users and reports session changes.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the current session, restoring a persisted one if available.
    async fn get_session(&self) -> Result<Option<AuthSession>, AuthError>;

    /// Resolves the user behind the current session with the provider.
    ///
    /// Returns `Ok(None)` when nobody is signed in.
    async fn get_user(&self) -> Result<Option<Identity>, AuthError>;

    /// Signs in with email and password.
    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<(), AuthError>;

    /// Registers a new account.
    async fn sign_up(&self, credentials: &Credentials) -> Result<(), AuthError>;

    /// Ends the current session.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Subscribes to auth state changes. Dropping the handle unsubscribes.
    fn on_auth_state_change(&self) -> AuthSubscription;
}
