//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - In-memory auth provider for tests and demos
//! - `storage` - Key-value stores, local movie storage and the backend factory
//! - `supabase` - Supabase GoTrue auth and PostgREST movie table

pub mod auth;
pub mod storage;
pub mod supabase;

pub use auth::MockAuthProvider;
pub use storage::{
    create_movie_storage, FileKeyValueStore, InMemoryKeyValueStore, LocalMovieStorage,
    StorageSelection,
};
pub use supabase::{SupabaseAuthProvider, SupabaseClient, SupabaseClientConfig, SupabaseMovieStorage};
