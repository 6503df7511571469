//! Supabase GoTrue adapter for email/password authentication.
//!
//! Implements the `AuthProvider` port over the GoTrue REST endpoints:
//!
//! - `POST /auth/v1/token?grant_type=password` - sign in
//! - `POST /auth/v1/signup` - register
//! - `POST /auth/v1/logout` - end the session
//! - `GET /auth/v1/user` - resolve the current user
//!
//! Session changes are broadcast to subscribers in the order they happen.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;

use super::client::{auth_failure, parse_session, GoTrueSession, SupabaseClient};
use crate::domain::auth::{
    AuthChangeEvent, AuthError, AuthEventKind, AuthSession, Credentials, Identity,
};
use crate::ports::{AuthListeners, AuthProvider, AuthSubscription};

/// GoTrue signup responds with a full session when no confirmation is
/// required, and with just the user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(GoTrueSession),
    PendingConfirmation {
        #[serde(default)]
        email: Option<String>,
    },
}

/// Supabase email/password auth provider.
pub struct SupabaseAuthProvider {
    client: Arc<SupabaseClient>,
    listeners: Arc<AuthListeners>,
}

impl SupabaseAuthProvider {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self {
            client,
            listeners: Arc::new(AuthListeners::new()),
        }
    }

    fn establish(&self, session: AuthSession) {
        tracing::info!(user_id = %session.user_id(), "Signed in");
        self.client.set_session(Some(session.clone()));
        self.listeners.emit(AuthChangeEvent::signed_in(session));
    }

    fn credentials_body(credentials: &Credentials) -> serde_json::Value {
        serde_json::json!({
            "email": credentials.email(),
            "password": credentials.password(),
        })
    }
}

impl std::fmt::Debug for SupabaseAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseAuthProvider")
            .field("client", &self.client)
            .field("listeners", &self.listeners)
            .finish()
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthProvider {
    async fn get_session(&self) -> Result<Option<AuthSession>, AuthError> {
        let Some(session) = self.client.session() else {
            return Ok(None);
        };

        if !session.is_expired_at(chrono::Utc::now().timestamp()) {
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.clone() else {
            tracing::debug!("Stored session expired without a refresh token");
            self.client.set_session(None);
            return Ok(None);
        };

        match self.client.refresh_session(&refresh_token).await {
            Ok(refreshed) => {
                tracing::debug!(user_id = %refreshed.user_id(), "Session refreshed");
                self.listeners.emit(AuthChangeEvent::new(
                    AuthEventKind::TokenRefreshed,
                    Some(refreshed.clone()),
                ));
                Ok(Some(refreshed))
            }
            Err(AuthError::Rejected(message)) => {
                tracing::info!(%message, "Refresh token rejected, dropping session");
                self.client.set_session(None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_user(&self) -> Result<Option<Identity>, AuthError> {
        self.client.fetch_user().await
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<(), AuthError> {
        tracing::debug!(email = %credentials.email(), "Signing in");

        let response = self
            .client
            .post_auth("token", Some("password"), &Self::credentials_body(credentials))
            .await?;
        let session = parse_session(response).await?;

        self.establish(session);
        Ok(())
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<(), AuthError> {
        tracing::debug!(email = %credentials.email(), "Signing up");

        let response = self
            .client
            .post_auth("signup", None, &Self::credentials_body(credentials))
            .await?;
        if !response.status().is_success() {
            return Err(auth_failure(response).await);
        }

        let payload: SignUpResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        match payload {
            SignUpResponse::Session(session) => self.establish(session.into_session()?),
            SignUpResponse::PendingConfirmation { email } => {
                tracing::info!(email = ?email, "Sign-up awaiting email confirmation");
            }
        }
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.client.session().is_some() {
            let response = self
                .client
                .request(Method::POST, self.client.auth_url("logout"))
                .send()
                .await
                .map_err(|e| AuthError::service_unavailable(e.to_string()))?;

            let status = response.status();
            let already_gone = matches!(
                status,
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
            );
            if !status.is_success() && !already_gone {
                return Err(auth_failure(response).await);
            }
        }

        self.client.set_session(None);
        self.listeners.emit(AuthChangeEvent::signed_out());
        tracing::info!("Signed out");
        Ok(())
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        self.listeners.subscribe()
    }
}
