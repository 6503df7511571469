//! Collection lifecycle integration tests.
//!
//! Wires `SessionManager` and `CollectionController` to the mock auth
//! provider and a per-user in-memory table, then checks that the collection
//! follows identity changes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use movie_collection::adapters::auth::MockAuthProvider;
use movie_collection::adapters::storage::{InMemoryKeyValueStore, LocalMovieStorage};
use movie_collection::application::{CollectionController, SessionManager};
use movie_collection::config::StorageMode;
use movie_collection::domain::auth::{AuthChangeEvent, AuthEventKind, AuthSession, Identity};
use movie_collection::domain::foundation::{MovieId, UserId};
use movie_collection::domain::movie::{Movie, MovieUpdate, NewMovie};
use movie_collection::ports::{AuthProvider, MovieStorage, StorageError};

// ════════════════════════════════════════════════════════════════════════════════
// Per-user table
// ════════════════════════════════════════════════════════════════════════════════

/// Remote-style storage: rows belong to whoever the provider says is signed in.
struct PerUserStorage {
    auth: Arc<MockAuthProvider>,
    rows: Mutex<HashMap<String, Vec<Movie>>>,
    get_all_calls: AtomicUsize,
    fail_reads: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
    entered: Notify,
}

impl PerUserStorage {
    fn new(auth: Arc<MockAuthProvider>) -> Self {
        Self {
            auth,
            rows: Mutex::new(HashMap::new()),
            get_all_calls: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            gate: Mutex::new(None),
            entered: Notify::new(),
        }
    }

    fn seed(self, user_id: &str, titles: &[&str]) -> Self {
        let movies = titles
            .iter()
            .map(|title| Movie::from_new(MovieId::generate(), new_movie(title)))
            .collect();
        self.rows.lock().unwrap().insert(user_id.to_string(), movies);
        self
    }

    /// Holds every following `get_all` until the returned handle is notified.
    fn hold_reads(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    fn get_all_calls(&self) -> usize {
        self.get_all_calls.load(Ordering::SeqCst)
    }

    async fn owner(&self, operation: &str) -> Result<String, StorageError> {
        match self.auth.get_user().await {
            Ok(Some(identity)) => Ok(identity.id.to_string()),
            _ => Err(StorageError::Unauthorized(operation.to_string())),
        }
    }
}

#[async_trait]
impl MovieStorage for PerUserStorage {
    async fn get_all(&self) -> Result<Vec<Movie>, StorageError> {
        self.get_all_calls.fetch_add(1, Ordering::SeqCst);
        let owner = self.owner("fetch movies").await?;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::backend("fetch movies", "timeout"));
        }

        self.entered.notify_one();
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&owner)
            .cloned()
            .unwrap_or_default())
    }

    async fn add(&self, movie: &NewMovie) -> Result<Movie, StorageError> {
        let owner = self.owner("add movies").await?;
        let stored = Movie::from_new(MovieId::generate(), movie.clone());
        self.rows
            .lock()
            .unwrap()
            .entry(owner)
            .or_default()
            .insert(0, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &MovieId, update: &MovieUpdate) -> Result<Movie, StorageError> {
        let owner = self.owner("update movies").await?;
        let mut rows = self.rows.lock().unwrap();
        let slot = rows
            .entry(owner)
            .or_default()
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| StorageError::NotFound(id.clone()))?;
        *slot = slot.with_update(update);
        Ok(slot.clone())
    }

    async fn delete(&self, id: &MovieId) -> Result<(), StorageError> {
        let owner = self.owner("delete movies").await?;
        self.rows
            .lock()
            .unwrap()
            .entry(owner)
            .or_default()
            .retain(|m| &m.id != id);
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════════

fn new_movie(title: &str) -> NewMovie {
    NewMovie::new(title, 2001, "Drama", 3, false).unwrap()
}

fn provider() -> MockAuthProvider {
    MockAuthProvider::new()
        .with_user("user-a", "a@example.com", "secret-a")
        .with_user("user-b", "b@example.com", "secret-b")
}

fn titles(controller: &CollectionController) -> Vec<String> {
    controller.movies().into_iter().map(|m| m.title).collect()
}

async fn eventually(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

struct Remote {
    auth: Arc<MockAuthProvider>,
    storage: Arc<PerUserStorage>,
    sessions: SessionManager,
    controller: Arc<CollectionController>,
}

fn remote(auth: MockAuthProvider, seed: impl FnOnce(PerUserStorage) -> PerUserStorage) -> Remote {
    let auth = Arc::new(auth);
    let storage = Arc::new(seed(PerUserStorage::new(Arc::clone(&auth))));
    let sessions = SessionManager::new(Arc::clone(&auth) as Arc<dyn AuthProvider>);
    let controller = Arc::new(CollectionController::with_storage(
        Arc::clone(&storage) as Arc<dyn MovieStorage>,
        StorageMode::Supabase,
    ));
    Remote {
        auth,
        storage,
        sessions,
        controller,
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Identity changes
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn initial_load_uses_restored_session() {
    let r = remote(provider().signed_in_as("user-a"), |s| {
        s.seed("user-a", &["Memento", "Heat"])
    });

    let mut events = r.sessions.initialize().await;
    r.controller.start(&mut events).await;

    assert_eq!(titles(&r.controller), vec!["Memento", "Heat"]);
    assert!(!r.controller.is_loading());
    assert_eq!(r.controller.loaded_identity().unwrap().as_str(), "user-a");
}

#[tokio::test]
async fn no_session_resolves_to_empty_without_fetching() {
    let r = remote(provider(), |s| s.seed("user-a", &["Memento"]));

    let mut events = r.sessions.initialize().await;
    r.controller.start(&mut events).await;

    assert!(r.controller.movies().is_empty());
    assert!(!r.controller.is_loading());
    assert_eq!(r.storage.get_all_calls(), 0);
}

#[tokio::test]
async fn identity_switch_replaces_collection() {
    let r = remote(provider().signed_in_as("user-a"), |s| {
        s.seed("user-a", &["Memento"]).seed("user-b", &["Amelie", "Up"])
    });
    let mut events = r.sessions.initialize().await;
    r.controller.start(&mut events).await;

    r.auth.switch_to("user-b");
    r.controller.process_pending(&mut events).await;

    assert_eq!(titles(&r.controller), vec!["Amelie", "Up"]);
    assert_eq!(r.controller.loaded_identity().unwrap().as_str(), "user-b");
    assert_eq!(r.storage.get_all_calls(), 2);
}

#[tokio::test]
async fn failed_switch_never_shows_previous_identity_movies() {
    let r = remote(provider().signed_in_as("user-a"), |s| {
        s.seed("user-a", &["A secret"]).seed("user-b", &["Amelie"])
    });
    let mut events = r.sessions.initialize().await;
    r.controller.start(&mut events).await;

    r.storage.fail_reads.store(true, Ordering::SeqCst);
    r.auth.switch_to("user-b");
    r.controller.process_pending(&mut events).await;

    assert!(r.controller.movies().is_empty());
    assert!(r.controller.loaded_identity().is_none());
    assert!(r.controller.error().is_some());

    r.storage.fail_reads.store(false, Ordering::SeqCst);
    r.auth.switch_to("user-b");
    r.controller.process_pending(&mut events).await;

    assert_eq!(titles(&r.controller), vec!["Amelie"]);
    assert_eq!(r.storage.get_all_calls(), 3);
}

#[tokio::test]
async fn same_identity_notification_does_not_reload() {
    let r = remote(provider().signed_in_as("user-a"), |s| s.seed("user-a", &["Memento"]));
    let mut events = r.sessions.initialize().await;
    r.controller.start(&mut events).await;

    let identity = Identity::new(UserId::new("user-a").unwrap(), "a@example.com");
    r.auth.emit(AuthChangeEvent::new(
        AuthEventKind::TokenRefreshed,
        Some(AuthSession::new(identity, "refreshed-token")),
    ));
    r.controller.process_pending(&mut events).await;

    assert_eq!(r.storage.get_all_calls(), 1);
    assert_eq!(titles(&r.controller), vec!["Memento"]);
}

#[tokio::test]
async fn sign_out_clears_collection() {
    let r = remote(provider().signed_in_as("user-a"), |s| s.seed("user-a", &["Memento"]));
    let mut events = r.sessions.initialize().await;
    r.controller.start(&mut events).await;

    r.sessions.sign_out().await.unwrap();
    r.controller.process_pending(&mut events).await;

    assert!(r.controller.movies().is_empty());
    assert!(r.controller.loaded_identity().is_none());
    assert!(r.sessions.identity().is_none());
}

#[tokio::test]
async fn sign_out_during_reload_ends_empty_and_idle() {
    let r = remote(provider(), |s| s.seed("user-a", &["Memento", "Heat"]));
    let events = r.sessions.initialize().await;
    let gate = r.storage.hold_reads();

    let controller = Arc::clone(&r.controller);
    let runner = tokio::spawn(async move { controller.run(events).await });

    r.auth.switch_to("user-a");
    r.storage.entered.notified().await;
    assert!(r.controller.is_loading());

    r.auth.switch_to("nobody");
    gate.notify_one();

    let controller = Arc::clone(&r.controller);
    eventually(move || controller.loaded_identity().is_none() && !controller.is_loading()).await;

    assert!(r.controller.movies().is_empty());
    assert_eq!(r.storage.get_all_calls(), 1);
    runner.abort();
}

#[tokio::test]
async fn sign_in_through_session_manager_loads_collection() {
    let r = remote(provider(), |s| s.seed("user-b", &["Amelie"]));
    let mut events = r.sessions.initialize().await;
    r.controller.start(&mut events).await;

    r.sessions.sign_in("b@example.com", "secret-b").await.unwrap();
    r.controller.process_pending(&mut events).await;

    assert_eq!(titles(&r.controller), vec!["Amelie"]);
}

// ════════════════════════════════════════════════════════════════════════════════
// Mutations
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn add_without_identity_is_unauthorized() {
    let r = remote(provider(), |s| s);
    let mut events = r.sessions.initialize().await;
    r.controller.start(&mut events).await;

    let result = r.controller.add_movie(new_movie("Memento")).await;

    assert!(result.unwrap_err().is_unauthorized());
    assert!(r.controller.movies().is_empty());
    assert_eq!(
        r.controller.error().as_deref(),
        Some("Must be authenticated to add movies")
    );
}

#[tokio::test]
async fn mutations_keep_collection_in_step_with_backend() {
    let r = remote(provider().signed_in_as("user-a"), |s| s.seed("user-a", &["Memento"]));
    let mut events = r.sessions.initialize().await;
    r.controller.start(&mut events).await;

    let added = r.controller.add_movie(new_movie("Heat")).await.unwrap();
    r.controller
        .update_movie(&added.id, MovieUpdate::new().watched(true))
        .await
        .unwrap();
    let memento = r.controller.movies()[1].id.clone();
    r.controller.delete_movie(&memento).await.unwrap();

    let movies = r.controller.movies();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].title, "Heat");
    assert!(movies[0].watched);

    r.controller.refresh().await.unwrap();
    assert_eq!(r.controller.movies(), movies);
}

// ════════════════════════════════════════════════════════════════════════════════
// Local mode and subscription lifetime
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn local_mode_ignores_identity_changes() {
    let auth = Arc::new(provider());
    let sessions = SessionManager::new(Arc::clone(&auth) as Arc<dyn AuthProvider>);
    let storage = Arc::new(LocalMovieStorage::new(Arc::new(InMemoryKeyValueStore::new())));
    storage.add(&new_movie("Memento")).await.unwrap();
    let controller = CollectionController::with_storage(storage, StorageMode::Local);

    let mut events = sessions.initialize().await;
    controller.start(&mut events).await;
    auth.switch_to("user-a");
    controller.process_pending(&mut events).await;
    auth.switch_to("nobody");
    controller.process_pending(&mut events).await;

    assert_eq!(titles(&controller), vec!["Memento"]);
    assert!(controller.loaded_identity().is_none());
}

#[tokio::test]
async fn aborting_run_releases_subscription() {
    let r = remote(provider(), |s| s);
    let events = r.sessions.initialize().await;
    assert_eq!(r.auth.subscriber_count(), 1);

    let controller = Arc::clone(&r.controller);
    let runner = tokio::spawn(async move { controller.run(events).await });
    tokio::task::yield_now().await;
    runner.abort();
    let _ = runner.await;

    assert_eq!(r.auth.subscriber_count(), 0);
}

#[tokio::test]
async fn run_returns_when_provider_is_gone() {
    let sessions = SessionManager::new(Arc::new(provider()));
    let storage = Arc::new(LocalMovieStorage::new(Arc::new(InMemoryKeyValueStore::new())));
    let controller = CollectionController::with_storage(storage, StorageMode::Local);
    let events = sessions.initialize().await;
    drop(sessions);

    tokio::time::timeout(Duration::from_secs(2), controller.run(events))
        .await
        .expect("run should end with the event stream");

    assert!(!controller.is_loading());
}
