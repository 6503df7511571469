//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Data directory must not be empty")]
    EmptyDataDir,

    #[error("Invalid Supabase URL format")]
    InvalidSupabaseUrl,

    #[error("Invalid request timeout")]
    InvalidTimeout,
}
