//! Durable key-value storage for serialized cart snapshots.
//!
//! The store reads a snapshot once at construction and writes one after
//! every committed mutation. Both calls are synchronous: a write either
//! lands before the operation returns or is reported through its error.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Synchronous key-value storage of serialized snapshots.
pub trait Storage: Send + Sync {
    /// Load the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backing medium cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backing medium cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// =============================================================================
// JsonFileStorage
// =============================================================================

/// File-backed storage: one JSON file per key under a base directory.
///
/// Keys are namespaced strings like `shopfront:cart`; characters that do not
/// belong in a file name are replaced before mapping the key to
/// `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Create a storage layer rooted at `dir`. The directory is created
    /// lazily on the first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }

    /// Base directory of this storage layer.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Storage for JsonFileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-memory storage for tests and ephemeral carts.
///
/// Records every write so tests can assert that no-op mutations skip
/// persistence entirely.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    saves: Mutex<Vec<String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage layer pre-seeded with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        storage
    }

    /// Number of times `save` has been called on any key.
    ///
    /// Tests use this to assert that no-op mutations skip the write.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self.saves
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.load("k").unwrap().is_none());

        storage.save("k", "[1,2]").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("[1,2]"));

        storage.save("k", "[]").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_storage_roundtrip_across_instances() {
        let dir = std::env::temp_dir().join(format!("shopfront-{}", uuid::Uuid::new_v4()));

        let storage = JsonFileStorage::new(&dir);
        assert!(storage.load("shopfront:cart").unwrap().is_none());
        storage.save("shopfront:cart", r#"[{"id":1}]"#).unwrap();

        // A fresh instance over the same directory sees the value.
        let reopened = JsonFileStorage::new(&dir);
        assert_eq!(
            reopened.load("shopfront:cart").unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_storage_sanitizes_keys() {
        let storage = JsonFileStorage::new("/tmp/shopfront");
        let path = storage.path_for("shopfront:cart");
        assert_eq!(path.file_name().unwrap(), "shopfront_cart.json");
    }
}
