//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `MOVIE_COLLECTION` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use movie_collection::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Storage mode: {}", config.storage.mode);
//! ```

mod error;
mod logging;
mod storage;
mod supabase;

pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use storage::{StorageConfig, StorageMode};
pub use supabase::SupabaseConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// local-only setup. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Backend selection and local data directory
    #[serde(default)]
    pub storage: StorageConfig,

    /// Supabase project (remote storage and auth)
    #[serde(default)]
    pub supabase: SupabaseConfig,

    /// Log filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `MOVIE_COLLECTION` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `MOVIE_COLLECTION__STORAGE__MODE=supabase` -> `storage.mode = supabase`
    /// - `MOVIE_COLLECTION__SUPABASE__ANON_KEY=...` -> `supabase.anon_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("MOVIE_COLLECTION")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.storage.validate()?;
        self.supabase.validate()?;
        if self.storage.mode.is_remote() && self.supabase.url.is_none() {
            tracing::warn!("Supabase storage selected without a project URL");
        }
        Ok(())
    }

    /// Check if the remote backend can be used
    pub fn remote_available(&self) -> bool {
        self.supabase.is_configured()
    }
}
