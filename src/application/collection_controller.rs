//! CollectionController - owns the in-memory movie collection.
//!
//! The backend is chosen once at construction. In local mode the collection
//! loads once and ignores the session. In remote mode loads follow identity:
//! the first resolution triggers the initial load, a different identity
//! triggers a reload, a sign-out clears the collection. A switch drops the
//! previous identity's movies before reloading; the identity only counts as
//! loaded once that reload succeeds.
//!
//! Session events are processed one at a time, each to completion, so reloads
//! never overlap. Mutations touch the in-memory collection only after the
//! backend confirms them.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::adapters::storage::StorageSelection;
use crate::config::StorageMode;
use crate::domain::foundation::{MovieId, UserId};
use crate::domain::movie::{Movie, MovieUpdate, NewMovie};
use crate::ports::{MovieStorage, StorageError};

use super::{SessionEvent, SessionEvents};

/// Snapshot of the collection as presentation sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionState {
    pub movies: Vec<Movie>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
struct ControllerState {
    collection: CollectionState,
    /// Identity of the current session, as last seen in an event.
    session_identity: Option<UserId>,
    /// Identity whose collection was last loaded successfully.
    loaded_identity: Option<UserId>,
}

/// Loads, reloads and mutates the movie collection.
pub struct CollectionController {
    storage: Arc<dyn MovieStorage>,
    mode: StorageMode,
    state: RwLock<ControllerState>,
}

impl CollectionController {
    /// Creates a controller for the selected backend. Starts loading.
    pub fn new(selection: StorageSelection) -> Self {
        Self::with_storage(selection.storage, selection.mode)
    }

    pub fn with_storage(storage: Arc<dyn MovieStorage>, mode: StorageMode) -> Self {
        Self {
            storage,
            mode,
            state: RwLock::new(ControllerState {
                collection: CollectionState {
                    loading: true,
                    ..CollectionState::default()
                },
                session_identity: None,
                loaded_identity: None,
            }),
        }
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Performs the initial load.
    ///
    /// Local mode loads immediately. Remote mode waits for the session's
    /// first resolution and acts on it.
    pub async fn start(&self, events: &mut SessionEvents) {
        match self.mode {
            StorageMode::Local => {
                self.load().await.ok();
            }
            StorageMode::Supabase => {
                if !self.process_next(events).await {
                    self.write().collection.loading = false;
                }
            }
        }
    }

    /// Takes and handles one session event. Returns false once the stream ends.
    pub async fn process_next(&self, events: &mut SessionEvents) -> bool {
        match events.next().await {
            Some(event) => {
                self.handle(event).await;
                true
            }
            None => false,
        }
    }

    /// Handles every session event that is already queued.
    pub async fn process_pending(&self, events: &mut SessionEvents) {
        while let Some(event) = events.try_next() {
            self.handle(event).await;
        }
    }

    /// Starts, then follows session events until the stream ends.
    ///
    /// Consumes the stream; the auth subscription is released when this returns.
    pub async fn run(&self, mut events: SessionEvents) {
        self.start(&mut events).await;
        while self.process_next(&mut events).await {}
        tracing::debug!("Session event stream ended");
    }

    async fn handle(&self, event: SessionEvent) {
        if self.mode == StorageMode::Local {
            return;
        }

        let Some(identity) = event.identity() else {
            self.clear();
            return;
        };

        {
            let mut state = self.write();
            if state.loaded_identity.as_ref() == Some(&identity.id) {
                tracing::debug!(user_id = %identity.id, "Identity unchanged, keeping collection");
                return;
            }
            state.session_identity = Some(identity.id.clone());
            state.loaded_identity = None;
            state.collection.movies.clear();
        }

        tracing::info!(user_id = %identity.id, "Loading collection for identity");
        if self.load().await.is_ok() {
            self.write().loaded_identity = Some(identity.id.clone());
        }
    }

    fn clear(&self) {
        let mut state = self.write();
        state.session_identity = None;
        state.loaded_identity = None;
        state.collection = CollectionState::default();
        tracing::info!("Collection cleared");
    }

    async fn load(&self) -> Result<(), StorageError> {
        {
            let mut state = self.write();
            state.collection.loading = true;
            state.collection.error = None;
        }

        let result = self.storage.get_all().await;

        let mut state = self.write();
        state.collection.loading = false;
        match result {
            Ok(movies) => {
                tracing::info!(count = movies.len(), "Collection loaded");
                state.collection.movies = movies;
                Ok(())
            }
            Err(error) => {
                tracing::error!(%error, "Failed to load collection");
                state.collection.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Reloads on demand.
    ///
    /// In remote mode without a signed-in identity this only clears.
    pub async fn refresh(&self) -> Result<(), StorageError> {
        if !self.mode.is_remote() {
            return self.load().await;
        }

        let Some(identity) = self.read().session_identity.clone() else {
            self.clear();
            return Ok(());
        };
        self.load().await?;
        self.write().loaded_identity = Some(identity);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds a movie and puts it at the front of the collection.
    pub async fn add_movie(&self, movie: NewMovie) -> Result<Movie, StorageError> {
        let stored = self.storage.add(&movie).await.map_err(|e| self.fail(e))?;

        let mut state = self.write();
        state.collection.movies.insert(0, stored.clone());
        state.collection.error = None;
        Ok(stored)
    }

    /// Applies a partial update and replaces the movie in place.
    pub async fn update_movie(
        &self,
        id: &MovieId,
        update: MovieUpdate,
    ) -> Result<Movie, StorageError> {
        let updated = self
            .storage
            .update(id, &update)
            .await
            .map_err(|e| self.fail(e))?;

        let mut state = self.write();
        if let Some(slot) = state.collection.movies.iter_mut().find(|m| &m.id == id) {
            *slot = updated.clone();
        }
        state.collection.error = None;
        Ok(updated)
    }

    /// Deletes a movie and filters it out of the collection.
    pub async fn delete_movie(&self, id: &MovieId) -> Result<(), StorageError> {
        self.storage.delete(id).await.map_err(|e| self.fail(e))?;

        let mut state = self.write();
        state.collection.movies.retain(|m| &m.id != id);
        state.collection.error = None;
        Ok(())
    }

    fn fail(&self, error: StorageError) -> StorageError {
        tracing::error!(%error, "Collection mutation failed");
        self.write().collection.error = Some(error.to_string());
        error
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> CollectionState {
        self.read().collection.clone()
    }

    pub fn movies(&self) -> Vec<Movie> {
        self.read().collection.movies.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read().collection.loading
    }

    pub fn error(&self) -> Option<String> {
        self.read().collection.error.clone()
    }

    /// Identity whose collection is currently loaded (remote mode only).
    pub fn loaded_identity(&self) -> Option<UserId> {
        self.read().loaded_identity.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, ControllerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ControllerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CollectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionController")
            .field("mode", &self.mode)
            .field("state", &*self.read())
            .finish()
    }
}
