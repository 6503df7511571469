//! Key-Value Store Port - durable string storage under fixed keys.
//!
//! The local movie adapter keeps the whole collection under one key; the
//! Supabase auth adapter persists the current session under another.
//! Operations are synchronous: implementations either touch memory or do a
//! small blocking file read/write.

/// Errors that can occur during key-value operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyValueError {
    #[error("Invalid key '{0}'")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Port for durable key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, KeyValueError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), KeyValueError>;
}
