//! Chooses the movie storage backend once at startup.

use std::sync::Arc;

use super::LocalMovieStorage;
use crate::adapters::supabase::{SupabaseClient, SupabaseMovieStorage};
use crate::config::{StorageConfig, StorageMode};
use crate::ports::{KeyValueStore, MovieStorage};

/// The selected backend and the mode it actually runs in.
///
/// `mode` can differ from the configured mode when Supabase was requested
/// but no client is available.
#[derive(Clone)]
pub struct StorageSelection {
    pub mode: StorageMode,
    pub storage: Arc<dyn MovieStorage>,
}

impl std::fmt::Debug for StorageSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageSelection")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Builds the movie storage for the configured mode.
///
/// Falls back to local storage when Supabase is selected without a client.
pub fn create_movie_storage(
    config: &StorageConfig,
    local_store: Arc<dyn KeyValueStore>,
    supabase: Option<Arc<SupabaseClient>>,
) -> StorageSelection {
    match (config.mode, supabase) {
        (StorageMode::Supabase, Some(client)) => {
            tracing::info!("Using Supabase movie storage");
            StorageSelection {
                mode: StorageMode::Supabase,
                storage: Arc::new(SupabaseMovieStorage::new(client)),
            }
        }
        (StorageMode::Supabase, None) => {
            tracing::warn!("Supabase storage selected but not configured, using local storage");
            local(local_store)
        }
        (StorageMode::Local, _) => {
            tracing::info!("Using local movie storage");
            local(local_store)
        }
    }
}

fn local(store: Arc<dyn KeyValueStore>) -> StorageSelection {
    StorageSelection {
        mode: StorageMode::Local,
        storage: Arc::new(LocalMovieStorage::new(store)),
    }
}
