//! Storage Adapters
//!
//! Key-value stores and the local implementation of the `MovieStorage` port.
//!
//! ## Available Adapters
//!
//! - **FileKeyValueStore** - One JSON file per key under a data directory
//! - **InMemoryKeyValueStore** - Values kept in memory (testing/development)
//! - **LocalMovieStorage** - The collection as one JSON blob in a key-value store
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{create_movie_storage, FileKeyValueStore};
//!
//! let store = Arc::new(FileKeyValueStore::new("./.movie-collection"));
//! let selection = create_movie_storage(&config.storage, store, supabase_client);
//! ```

mod factory;
mod file_key_value_store;
mod in_memory_key_value_store;
mod local_movie_storage;

pub use factory::{create_movie_storage, StorageSelection};
pub use file_key_value_store::FileKeyValueStore;
pub use in_memory_key_value_store::InMemoryKeyValueStore;
pub use local_movie_storage::{LocalMovieStorage, STORAGE_KEY};
