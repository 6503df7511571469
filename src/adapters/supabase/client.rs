//! Shared Supabase HTTP client.
//!
//! Holds the project URL, the anon key, and the current auth session. Both
//! the auth provider and the movie table adapter go through it, so a sign-in
//! immediately changes the bearer token used for table requests.
//!
//! The session is persisted in a [`KeyValueStore`] under [`SESSION_KEY`] so a
//! later process run can restore it.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::config::SupabaseConfig;
use crate::domain::auth::{AuthError, AuthSession, Identity};
use crate::domain::foundation::UserId;
use crate::ports::KeyValueStore;

/// Key under which the current session is persisted.
pub const SESSION_KEY: &str = "auth-session";

/// Connection settings for a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseClientConfig {
    base_url: String,
    anon_key: Secret<String>,
    timeout: Duration,
}

impl SupabaseClientConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: Secret::new(anon_key.into()),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds client settings from application config, if the project is configured.
    pub fn from_config(config: &SupabaseConfig) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }
        let url = config.url.as_deref()?;
        let anon_key = config.anon_key.as_deref()?;
        Some(Self::new(url, anon_key).with_timeout(config.timeout()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn anon_key(&self) -> &str {
        self.anon_key.expose_secret()
    }
}

/// User object as returned by GoTrue.
#[derive(Debug, Deserialize)]
pub(crate) struct GoTrueUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl GoTrueUser {
    pub fn into_identity(self) -> Result<Identity, AuthError> {
        let id = UserId::new(self.id)
            .map_err(|e| AuthError::InvalidResponse(format!("user id: {}", e)))?;
        Ok(Identity::new(id, self.email.unwrap_or_default()))
    }
}

/// Session payload as returned by GoTrue's token and signup endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct GoTrueSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: GoTrueUser,
}

impl GoTrueSession {
    pub fn into_session(self) -> Result<AuthSession, AuthError> {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| chrono::Utc::now().timestamp() + secs));
        let mut session = AuthSession::new(self.user.into_identity()?, self.access_token);
        if let Some(refresh_token) = self.refresh_token {
            session = session.with_refresh_token(refresh_token);
        }
        if let Some(expires_at) = expires_at {
            session = session.with_expires_at(expires_at);
        }
        Ok(session)
    }
}

/// HTTP client for one Supabase project.
pub struct SupabaseClient {
    config: SupabaseClientConfig,
    http: Client,
    session: RwLock<Option<AuthSession>>,
    store: Arc<dyn KeyValueStore>,
}

impl SupabaseClient {
    /// Creates a client and restores any persisted session.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` if the HTTP client cannot be built.
    pub fn new(config: SupabaseClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::service_unavailable(format!("HTTP client: {}", e)))?;

        let restored = restore_session(store.as_ref());
        if restored.is_some() {
            tracing::debug!("Restored persisted auth session");
        }

        Ok(Self {
            config,
            http,
            session: RwLock::new(restored),
            store,
        })
    }

    pub fn config(&self) -> &SupabaseClientConfig {
        &self.config
    }

    /// PostgREST URL for a table.
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, table)
    }

    /// GoTrue URL for an endpoint path such as `token` or `user`.
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.base_url, path)
    }

    /// Starts a request carrying the `apikey` header and a bearer token.
    ///
    /// The bearer is the session's access token when signed in, otherwise
    /// the anon key.
    pub fn request(&self, method: Method, url: impl AsRef<str>) -> RequestBuilder {
        let bearer = self
            .session()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.config.anon_key().to_string());

        self.http
            .request(method, url.as_ref())
            .header("apikey", self.config.anon_key())
            .bearer_auth(bearer)
    }

    /// Current in-memory session.
    pub fn session(&self) -> Option<AuthSession> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the current session and persists the change.
    pub fn set_session(&self, session: Option<AuthSession>) {
        let persisted = match &session {
            Some(session) => serde_json::to_string(session)
                .map_err(|e| e.to_string())
                .and_then(|json| self.store.set(SESSION_KEY, &json).map_err(|e| e.to_string())),
            None => self.store.remove(SESSION_KEY).map_err(|e| e.to_string()),
        };
        if let Err(error) = persisted {
            tracing::warn!(%error, "Failed to persist auth session");
        }

        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Resolves the user behind the current session with GoTrue.
    ///
    /// Returns `Ok(None)` without a network call when there is no session, and
    /// when the server no longer accepts the access token.
    pub async fn fetch_user(&self) -> Result<Option<Identity>, AuthError> {
        if self.session().is_none() {
            return Ok(None);
        }

        let response = self
            .request(Method::GET, self.auth_url("user"))
            .send()
            .await
            .map_err(unreachable)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::debug!(%status, "Access token no longer accepted");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(auth_failure(response).await);
        }

        let user: GoTrueUser = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        user.into_identity().map(Some)
    }

    /// Exchanges the refresh token for a new session.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", self.config.anon_key())
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(unreachable)?;

        let session = parse_session(response).await?;
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    /// Sends a GoTrue request with the anon key only.
    pub(crate) async fn post_auth(
        &self,
        path: &str,
        grant_type: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<Response, AuthError> {
        let mut request = self
            .http
            .post(self.auth_url(path))
            .header("apikey", self.config.anon_key())
            .json(body);
        if let Some(grant_type) = grant_type {
            request = request.query(&[("grant_type", grant_type)]);
        }
        request.send().await.map_err(unreachable)
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.config.base_url)
            .field("signed_in", &self.session().is_some())
            .finish()
    }
}

fn restore_session(store: &dyn KeyValueStore) -> Option<AuthSession> {
    let raw = match store.get(SESSION_KEY) {
        Ok(raw) => raw?,
        Err(error) => {
            tracing::warn!(%error, "Failed to read persisted auth session");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(error) => {
            tracing::warn!(%error, "Discarding malformed persisted auth session");
            store.remove(SESSION_KEY).ok();
            None
        }
    }
}

/// Reads a session from a successful GoTrue response, or the error otherwise.
pub(crate) async fn parse_session(response: Response) -> Result<AuthSession, AuthError> {
    if !response.status().is_success() {
        return Err(auth_failure(response).await);
    }
    let payload: GoTrueSession = response
        .json()
        .await
        .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
    payload.into_session()
}

/// Maps a failed GoTrue response to an auth error carrying the server's message.
pub(crate) async fn auth_failure(response: Response) -> AuthError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);

    tracing::debug!(%status, %message, "GoTrue request rejected");

    if status.is_server_error() {
        AuthError::service_unavailable(message)
    } else {
        AuthError::rejected(message)
    }
}

/// Extracts the human-readable message from a Supabase error body.
///
/// GoTrue uses `error_description` or `msg`, PostgREST uses `message`.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = parsed.as_ref().and_then(|value| {
        ["error_description", "msg", "message", "error"]
            .iter()
            .find_map(|field| value.get(*field).and_then(|v| v.as_str()))
            .map(str::to_string)
    });

    match message {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!("HTTP {}", status),
    }
}

fn unreachable(error: reqwest::Error) -> AuthError {
    tracing::warn!(%error, "Auth service request failed");
    AuthError::service_unavailable(error.to_string())
}
