//! Authentication errors.
//!
//! These errors are **domain-centric** - they describe what went wrong from
//! the application's perspective, not the auth provider's.

use thiserror::Error;

use crate::domain::foundation::ValidationError;

/// Errors from sign-in, sign-up, sign-out and session lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The provider rejected the request; carries its message verbatim.
    #[error("{0}")]
    Rejected(String),

    /// The credentials failed client-side checks before any request was made.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(#[from] ValidationError),

    /// The provider responded with something we could not interpret.
    #[error("Unexpected auth response: {0}")]
    InvalidResponse(String),

    /// The authentication service is unreachable.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}
