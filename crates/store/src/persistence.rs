//! Key-value persistence for the cart and the order ledger.
//!
//! Each store owns one key and overwrites its document wholesale on every
//! change. Documents are pretty-printed JSON so they can be read and diffed
//! by hand.
//!
//! Reads never fail: a missing key, an unreadable file, and a document that
//! does not parse all come back as `None`, and the caller starts empty.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Key under which the cart store persists its lines.
pub const CART_KEY: &str = "cart";

/// Key under which the order store persists its ledger.
pub const ORDERS_KEY: &str = "orders";

/// Errors from writing or removing a document.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem operation failed.
    #[error("storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    /// The value could not be encoded.
    #[error("failed to encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Keys are limited to lowercase letters, digits, `-` and `_`.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A durable key-value document store.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// The bytes stored under `key`, or `None` if absent or unreadable.
    fn read(&self, key: &str) -> Option<Vec<u8>>;

    /// Store `bytes` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the value could not be stored.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError>;

    /// Delete `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the key exists but could not be removed.
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Decode the document under `key`.
///
/// Returns `None` when the key is absent or the document does not decode as
/// `T`; decode failures are logged as warnings.
pub fn load_document<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let bytes = store.read(key)?;
    match serde_json::from_slice::<T>(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                key = %key,
                error = %e,
                "failed to decode stored document; treating as absent"
            );
            None
        }
    }
}

/// Encode `value` as pretty JSON and store it under `key`.
///
/// # Errors
///
/// Returns [`PersistenceError`] if encoding or the write fails.
pub fn save_document<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| PersistenceError::Encode {
        key: key.to_owned(),
        source,
    })?;
    store.write(key, &bytes)
}

fn validate_key(key: &str) -> Result<(), PersistenceError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::InvalidKey(key.to_owned()))
    }
}

// =============================================================================
// File-backed store
// =============================================================================

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to `<key>.json.tmp` first and are then renamed into place, so a
/// crash mid-write never leaves a truncated document behind. The directory is
/// created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        let path = match self.path_for(key) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "refusing to read");
                return None;
            }
        };

        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to read stored document; treating as absent"
                );
                None
            }
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        let io_err = |source| PersistenceError::Io {
            key: key.to_owned(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, bytes).map_err(io_err)?;
        std::fs::rename(&tmp_path, &path).map_err(io_err)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// An in-process store for tests and throwaway sessions.
///
/// Counts writes so callers can check that a no-op mutation did not persist.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `write` calls so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Whether `key` currently holds a value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key).cloned()
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        validate_key(key)?;
        self.lock().insert(key.to_owned(), bytes.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));

        assert_eq!(store.read(CART_KEY), None);
        store.write(CART_KEY, b"[1,2,3]").unwrap();
        assert_eq!(store.read(CART_KEY).as_deref(), Some(&b"[1,2,3]"[..]));
        assert!(dir.path().join("data").join("cart.json").exists());
        assert!(!dir.path().join("data").join("cart.json.tmp").exists());
    }

    #[test]
    fn test_file_store_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.write(ORDERS_KEY, b"[]").unwrap();
        store.remove(ORDERS_KEY).unwrap();
        assert_eq!(store.read(ORDERS_KEY), None);
        // Removing again is fine.
        store.remove(ORDERS_KEY).unwrap();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(
            store.write("../escape", b"x"),
            Err(PersistenceError::InvalidKey(_))
        ));
        assert_eq!(store.read("../escape"), None);
    }

    #[test]
    fn test_load_document_treats_garbage_as_absent() {
        let store = MemoryStore::new();
        store.write(CART_KEY, b"{ not json").unwrap();
        assert_eq!(load_document::<Vec<u32>>(&store, CART_KEY), None);
    }

    #[test]
    fn test_load_document_treats_wrong_shape_as_absent() {
        let store = MemoryStore::new();
        store.write(CART_KEY, br#"{"lines": 3}"#).unwrap();
        assert_eq!(load_document::<Vec<u32>>(&store, CART_KEY), None);
    }

    #[test]
    fn test_save_document_is_pretty_json() {
        let store = MemoryStore::new();
        save_document(&store, ORDERS_KEY, &vec![1u32, 2]).unwrap();

        let text = String::from_utf8(store.read(ORDERS_KEY).unwrap()).unwrap();
        assert!(text.contains('\n'));
        assert_eq!(load_document::<Vec<u32>>(&store, ORDERS_KEY), Some(vec![1, 2]));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_memory_store_remove() {
        let store = MemoryStore::new();
        store.write(CART_KEY, b"[]").unwrap();
        assert!(store.contains(CART_KEY));
        store.remove(CART_KEY).unwrap();
        assert!(!store.contains(CART_KEY));
    }
}
