//! Local Movie Storage Adapter
//!
//! Keeps the whole collection as one JSON array under a single key of a
//! [`KeyValueStore`]. Every operation reads the blob, mutates it, and writes
//! it back. There is no locking; the last write wins.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::MovieId;
use crate::domain::movie::{Movie, MovieUpdate, NewMovie};
use crate::ports::{KeyValueStore, MovieStorage, StorageError};

/// Key under which the collection is stored.
pub const STORAGE_KEY: &str = "movie-collection";

/// Movie storage backed by a local key-value store
#[derive(Clone)]
pub struct LocalMovieStorage {
    store: Arc<dyn KeyValueStore>,
}

impl LocalMovieStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read_all(&self, operation: &'static str) -> Result<Vec<Movie>, StorageError> {
        let raw = self
            .store
            .get(STORAGE_KEY)
            .map_err(|e| StorageError::backend(operation, e.to_string()))?;

        match raw {
            None => Ok(Vec::new()),
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                tracing::error!(error = %e, "Stored movie collection is malformed");
                StorageError::Deserialization(e.to_string())
            }),
        }
    }

    fn write_all(&self, operation: &'static str, movies: &[Movie]) -> Result<(), StorageError> {
        let json = serde_json::to_string(movies)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.store
            .set(STORAGE_KEY, &json)
            .map_err(|e| StorageError::backend(operation, e.to_string()))
    }
}

impl std::fmt::Debug for LocalMovieStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalMovieStorage")
            .field("key", &STORAGE_KEY)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MovieStorage for LocalMovieStorage {
    async fn get_all(&self) -> Result<Vec<Movie>, StorageError> {
        let movies = self.read_all("fetch movies")?;
        tracing::debug!(count = movies.len(), "Loaded local movie collection");
        Ok(movies)
    }

    async fn add(&self, movie: &NewMovie) -> Result<Movie, StorageError> {
        let mut movies = self.read_all("add movie")?;
        let stored = Movie::from_new(MovieId::generate(), movie.clone());

        movies.insert(0, stored.clone());
        self.write_all("add movie", &movies)?;

        tracing::debug!(movie_id = %stored.id, "Added movie to local collection");
        Ok(stored)
    }

    async fn update(&self, id: &MovieId, update: &MovieUpdate) -> Result<Movie, StorageError> {
        let mut movies = self.read_all("update movie")?;
        let position = movies
            .iter()
            .position(|m| &m.id == id)
            .ok_or_else(|| StorageError::NotFound(id.clone()))?;

        let updated = movies[position].with_update(update);
        movies[position] = updated.clone();
        self.write_all("update movie", &movies)?;

        tracing::debug!(movie_id = %id, "Updated movie in local collection");
        Ok(updated)
    }

    async fn delete(&self, id: &MovieId) -> Result<(), StorageError> {
        let mut movies = self.read_all("delete movie")?;
        let before = movies.len();
        movies.retain(|m| &m.id != id);

        if movies.len() != before {
            self.write_all("delete movie", &movies)?;
            tracing::debug!(movie_id = %id, "Deleted movie from local collection");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::{FileKeyValueStore, InMemoryKeyValueStore};
    use crate::ports::KeyValueError;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn storage() -> (LocalMovieStorage, InMemoryKeyValueStore) {
        let store = InMemoryKeyValueStore::new();
        (LocalMovieStorage::new(Arc::new(store.clone())), store)
    }

    fn new_movie(title: &str) -> NewMovie {
        NewMovie::new(title, 1999, "Action", 3, false).unwrap()
    }

    /// Store whose writes always fail
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, KeyValueError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), KeyValueError> {
            Err(KeyValueError::Io("disk full".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), KeyValueError> {
            Ok(())
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // get_all
    // ═══════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn absent_key_reads_as_empty_collection() {
        let (storage, _) = storage();
        assert!(storage.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_blob_is_a_deserialization_error() {
        let store = InMemoryKeyValueStore::new().with_value(STORAGE_KEY, "{not json");
        let storage = LocalMovieStorage::new(Arc::new(store));

        let result = storage.get_all().await;

        assert!(matches!(result, Err(StorageError::Deserialization(_))));
    }

    #[tokio::test]
    async fn reads_existing_blob() {
        let blob = r#"[{"id":"m-1","title":"Heat","year":1995,"genre":"Thriller","rating":4,"watched":true}]"#;
        let store = InMemoryKeyValueStore::new().with_value(STORAGE_KEY, blob);
        let storage = LocalMovieStorage::new(Arc::new(store));

        let movies = storage.get_all().await.unwrap();

        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Heat");
        assert_eq!(movies[0].rating.value(), 4);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // add
    // ═══════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn add_inserts_at_front_and_persists() {
        let (storage, store) = storage();

        let first = storage.add(&new_movie("Alien")).await.unwrap();
        let second = storage.add(&new_movie("Aliens")).await.unwrap();

        let movies = storage.get_all().await.unwrap();
        assert_eq!(movies, vec![second, first]);
        assert!(store.get(STORAGE_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn add_copies_every_field() {
        let (storage, _) = storage();
        let draft = NewMovie::new("Up", 2009, "Animation", 5, true).unwrap();

        let movie = storage.add(&draft).await.unwrap();

        assert_eq!(movie.title, "Up");
        assert_eq!(movie.year, 2009);
        assert_eq!(movie.genre, "Animation");
        assert_eq!(movie.rating.value(), 5);
        assert!(movie.watched);
    }

    #[tokio::test]
    async fn failed_write_surfaces_backend_error() {
        let storage = LocalMovieStorage::new(Arc::new(ReadOnlyStore));

        let err = storage.add(&new_movie("Alien")).await.unwrap_err();

        assert_eq!(err, StorageError::backend("add movie", "IO error: disk full"));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // update / delete
    // ═══════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn update_replaces_only_present_fields() {
        let (storage, _) = storage();
        let movie = storage.add(&new_movie("Alien")).await.unwrap();

        let updated = storage
            .update(&movie.id, &MovieUpdate::new().watched(true))
            .await
            .unwrap();

        assert!(updated.watched);
        assert_eq!(updated.title, "Alien");
        assert_eq!(storage.get_all().await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn update_rating_leaves_other_fields_and_records_untouched() {
        let (storage, _) = storage();
        let alien = storage.add(&new_movie("Alien")).await.unwrap();
        let heat = storage
            .add(&NewMovie::new("Heat", 1995, "Thriller", 4, true).unwrap())
            .await
            .unwrap();
        let up = storage.add(&new_movie("Up")).await.unwrap();
        let untouched_before: Vec<String> = [&up, &alien]
            .iter()
            .map(|m| serde_json::to_string(m).unwrap())
            .collect();

        let updated = storage
            .update(&heat.id, &MovieUpdate::new().rating(5).unwrap())
            .await
            .unwrap();

        assert_eq!(updated.rating.value(), 5);
        assert_eq!(updated, Movie { rating: updated.rating, ..heat });

        let movies = storage.get_all().await.unwrap();
        assert_eq!(movies.len(), 3);
        assert_eq!(movies[1], updated);
        let untouched_after: Vec<String> = [&movies[0], &movies[2]]
            .iter()
            .map(|m| serde_json::to_string(m).unwrap())
            .collect();
        assert_eq!(untouched_after, untouched_before);
    }

    #[tokio::test]
    async fn first_movie_in_empty_store_reads_back_as_a_card() {
        let (storage, _) = storage();
        assert!(storage.get_all().await.unwrap().is_empty());

        let added = storage
            .add(&NewMovie::new("The Matrix", 1999, "Action", 5, false).unwrap())
            .await
            .unwrap();

        let movies = storage.get_all().await.unwrap();
        assert_eq!(movies, vec![added]);
        assert_eq!(movies[0].title, "The Matrix");
        assert_eq!(movies[0].subtitle(), "1999 • Action");
        assert_eq!(movies[0].rating.stars(), "★★★★★");
        assert_eq!(movies[0].status_label(), "Unwatched");
        assert!(!movies[0].id.as_str().is_empty());
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let (storage, _) = storage();
        storage.add(&new_movie("Alien")).await.unwrap();
        let missing = MovieId::new("missing").unwrap();

        let result = storage.update(&missing, &MovieUpdate::new().year(2000)).await;

        assert_eq!(result, Err(StorageError::NotFound(missing)));
    }

    #[tokio::test]
    async fn delete_removes_movie() {
        let (storage, _) = storage();
        let keep = storage.add(&new_movie("Alien")).await.unwrap();
        let gone = storage.add(&new_movie("Aliens")).await.unwrap();

        storage.delete(&gone.id).await.unwrap();

        assert_eq!(storage.get_all().await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn delete_unknown_id_is_a_no_op() {
        let (storage, _) = storage();
        let movie = storage.add(&new_movie("Alien")).await.unwrap();

        storage.delete(&MovieId::new("missing").unwrap()).await.unwrap();

        assert_eq!(storage.get_all().await.unwrap(), vec![movie]);
    }

    #[tokio::test]
    async fn collection_survives_a_new_adapter_on_the_same_directory() {
        let temp_dir = TempDir::new().unwrap();
        let first = LocalMovieStorage::new(Arc::new(FileKeyValueStore::new(temp_dir.path())));
        let movie = first.add(&new_movie("Alien")).await.unwrap();

        let second = LocalMovieStorage::new(Arc::new(FileKeyValueStore::new(temp_dir.path())));

        assert_eq!(second.get_all().await.unwrap(), vec![movie]);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Properties
    // ═══════════════════════════════════════════════════════════════════════

    proptest! {
        #[test]
        fn adds_come_back_newest_first_with_unique_ids(
            titles in proptest::collection::vec("[a-zA-Z][a-zA-Z ]{0,20}", 1..12)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let (storage, _) = storage();

            let added: Vec<Movie> = runtime.block_on(async {
                let mut added = Vec::new();
                for title in &titles {
                    added.push(storage.add(&new_movie(title)).await.unwrap());
                }
                added
            });
            let listed = runtime.block_on(storage.get_all()).unwrap();

            let expected: Vec<Movie> = added.into_iter().rev().collect();
            prop_assert_eq!(&listed, &expected);

            let ids: HashSet<&str> = listed.iter().map(|m| m.id.as_str()).collect();
            prop_assert_eq!(ids.len(), listed.len());
        }
    }
}
