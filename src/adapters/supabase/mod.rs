//! Supabase adapters.
//!
//! - **SupabaseClient** - shared HTTP client holding the project settings and current session
//! - **SupabaseAuthProvider** - `AuthProvider` over GoTrue
//! - **SupabaseMovieStorage** - `MovieStorage` over the PostgREST `movies` table

mod auth_provider;
mod client;
mod movie_storage;
mod rows;

pub use auth_provider::SupabaseAuthProvider;
pub use client::{SupabaseClient, SupabaseClientConfig, SESSION_KEY};
pub use movie_storage::SupabaseMovieStorage;
