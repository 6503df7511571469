//! File-based Key-Value Store Adapter
//!
//! Stores each key as `<key>.json` under a base directory. This is the
//! durable local store used outside of tests.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::ports::{KeyValueError, KeyValueStore};

/// File-based key-value store
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_path: PathBuf,
}

impl FileKeyValueStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// The directory is created lazily on the first write.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileKeyValueStore::new("./.movie-collection");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the base directory
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the file path for a key
    fn key_path(&self, key: &str) -> Result<PathBuf, KeyValueError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(KeyValueError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, KeyValueError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KeyValueError::Io(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KeyValueError> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.base_path).map_err(|e| KeyValueError::Io(e.to_string()))?;
        fs::write(&path, value).map_err(|e| KeyValueError::Io(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), KeyValueError> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(KeyValueError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_key_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        assert_eq!(store.get("movie-collection").unwrap(), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.set("movie-collection", "[]").unwrap();

        assert_eq!(store.get("movie-collection").unwrap().as_deref(), Some("[]"));
        assert!(temp_dir.path().join("movie-collection.json").exists());
    }

    #[test]
    fn set_creates_missing_base_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("data");
        let store = FileKeyValueStore::new(&nested);

        store.set("auth-session", "{}").unwrap();

        assert!(nested.join("auth-session.json").exists());
    }

    #[test]
    fn values_survive_a_new_store_instance() {
        let temp_dir = TempDir::new().unwrap();
        FileKeyValueStore::new(temp_dir.path()).set("k", "v").unwrap();

        let reopened = FileKeyValueStore::new(temp_dir.path());

        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        assert!(store.remove("never-written").is_ok());
    }

    #[test]
    fn rejects_keys_that_could_escape_the_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        assert!(matches!(store.get("../etc"), Err(KeyValueError::InvalidKey(_))));
        assert!(matches!(store.set("", "x"), Err(KeyValueError::InvalidKey(_))));
    }
}
