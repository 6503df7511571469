//! Movie Storage Port - the contract every persistence backend satisfies.
//!
//! Two adapters implement it: local (JSON blob in a key-value store) and
//! remote (Supabase table). Callers hold an `Arc<dyn MovieStorage>` chosen once
//! at startup and never branch on which backend is behind it.
//!
//! Every operation is a single request/response. Nothing here retries.

use async_trait::async_trait;

use crate::domain::foundation::MovieId;
use crate::domain::movie::{Movie, MovieUpdate, NewMovie};

/// Errors that can occur during movie storage operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Movie with id {0} not found")]
    NotFound(MovieId),

    #[error("Must be authenticated to {0}")]
    Unauthorized(String),

    #[error("Failed to {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    #[error("Failed to serialize movies: {0}")]
    Serialization(String),

    #[error("Failed to deserialize movies: {0}")]
    Deserialization(String),
}

impl StorageError {
    /// Creates a backend error for the named operation (e.g. "fetch movies").
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }

    /// Returns true for the authorization subtype.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, StorageError::Unauthorized(_))
    }
}

/// Port for reading and writing the movie collection
#[async_trait]
pub trait MovieStorage: Send + Sync {
    /// Load every movie visible to the current caller, newest first.
    ///
    /// # Errors
    /// `Backend` on transport failure, `Deserialization` on malformed data
    async fn get_all(&self) -> Result<Vec<Movie>, StorageError>;

    /// Store a new movie and return it with its freshly assigned id.
    ///
    /// # Errors
    /// `Unauthorized` if the backend requires an identity and none is present,
    /// `Backend` if the write is rejected
    async fn add(&self, movie: &NewMovie) -> Result<Movie, StorageError>;

    /// Apply a partial update and return the updated movie.
    ///
    /// # Errors
    /// `NotFound` if no movie has this id
    async fn update(&self, id: &MovieId, update: &MovieUpdate) -> Result<Movie, StorageError>;

    /// Delete a movie. Deleting an unknown id is not an error.
    ///
    /// # Errors
    /// `Backend` on transport failure
    async fn delete(&self, id: &MovieId) -> Result<(), StorageError>;
}
