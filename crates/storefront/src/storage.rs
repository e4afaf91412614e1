//! Keyed local persistence for store state.
//!
//! Each store owns one disjoint key. Values are JSON documents wrapped in an
//! envelope `{"state": ..., "version": 0}`; there is no schema migration and no
//! expiry. Persistence is best-effort: [`Persisted`] logs failures instead of
//! surfacing them to store callers.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Storage keys, one per store.
pub mod keys {
    /// Cart lines and the open/closed flag.
    pub const CART: &str = "cart-storage";
    /// Cached product catalog.
    pub const PRODUCTS: &str = "products-storage";
    /// Locally known orders.
    pub const ORDERS: &str = "order-storage";
    /// Logged-in user and bearer token.
    pub const AUTH: &str = "auth-storage";
}

/// Current envelope version. Never bumped; kept for format compatibility.
const ENVELOPE_VERSION: u32 = 0;

/// Errors raised by a [`Storage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be (de)serialized.
    #[error("storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A synchronous key/value store of raw JSON documents.
pub trait Storage: Send + Sync {
    /// Read the document stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the document stored under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the state directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The state directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Each writer gets its own sibling temp file; the rename is atomic, so
        // readers never see a torn file even with several processes saving.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(key)).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// On-disk envelope around a store's state.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub state: T,
    #[serde(default)]
    pub version: u32,
}

/// Read and decode the state stored under `key`.
///
/// # Errors
///
/// Returns an error if the backend fails or the document does not decode.
pub fn read_state<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    storage
        .load(key)?
        .map(|raw| serde_json::from_str::<Envelope<T>>(&raw).map(|env| env.state))
        .transpose()
        .map_err(StorageError::from)
}

/// Typed, best-effort persistence handle for one store.
pub struct Persisted<T> {
    storage: Arc<dyn Storage>,
    key: &'static str,
    _state: std::marker::PhantomData<fn() -> T>,
}

impl<T> Clone for Persisted<T> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            key: self.key,
            _state: std::marker::PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Persisted<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persisted")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Bind a store's state to `key`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, key: &'static str) -> Self {
        Self {
            storage,
            key,
            _state: std::marker::PhantomData,
        }
    }

    /// The storage key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Load the persisted state, falling back to the default when it is
    /// missing or unreadable.
    #[must_use]
    pub fn load(&self) -> T {
        match read_state(self.storage.as_ref(), self.key) {
            Ok(Some(state)) => state,
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key = self.key, error = %e, "Discarding unreadable persisted state");
                T::default()
            }
        }
    }

    /// Persist `state`. Failures are logged and otherwise ignored.
    pub fn save(&self, state: &T) {
        let envelope = Envelope {
            state,
            version: ENVELOPE_VERSION,
        };
        let result = serde_json::to_string(&envelope)
            .map_err(StorageError::from)
            .and_then(|raw| self.storage.save(self.key, &raw));

        if let Err(e) = result {
            warn!(key = self.key, error = %e, "Failed to persist store state");
        }
    }

    /// Drop the persisted entry so the next load starts from the default.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(self.key) {
            warn!(key = self.key, error = %e, "Failed to clear persisted state");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        hits: u32,
    }

    #[test]
    fn test_memory_round_trip_uses_envelope() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let persisted = Persisted::<Counter>::new(Arc::clone(&storage), "counter");

        persisted.save(&Counter { hits: 3 });

        let raw = storage.load("counter").unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json, serde_json::json!({ "state": { "hits": 3 }, "version": 0 }));
        assert_eq!(persisted.load(), Counter { hits: 3 });
    }

    #[test]
    fn test_missing_key_loads_default() {
        let persisted = Persisted::<Counter>::new(Arc::new(MemoryStorage::new()), "counter");
        assert_eq!(persisted.load(), Counter::default());
    }

    #[test]
    fn test_corrupt_entry_loads_default() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.save("counter", "{not json").unwrap();
        let persisted = Persisted::<Counter>::new(storage, "counter");
        assert_eq!(persisted.load(), Counter::default());
    }

    #[test]
    fn test_clear_removes_entry() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let persisted = Persisted::<Counter>::new(Arc::clone(&storage), "counter");
        persisted.save(&Counter { hits: 1 });

        persisted.clear();
        assert!(storage.load("counter").unwrap().is_none());
        assert_eq!(persisted.load(), Counter::default());
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("state")).unwrap();

        assert!(storage.load("cart-storage").unwrap().is_none());
        storage.save("cart-storage", "{\"state\":{}}").unwrap();
        assert_eq!(
            storage.load("cart-storage").unwrap().as_deref(),
            Some("{\"state\":{}}")
        );
        assert!(storage.dir().join("cart-storage.json").exists());

        storage.remove("cart-storage").unwrap();
        storage.remove("cart-storage").unwrap();
        assert!(storage.load("cart-storage").unwrap().is_none());
    }

    #[test]
    fn test_concurrent_saves_never_leave_a_torn_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        let payloads: Vec<String> = (0..8u8)
            .map(|n| {
                let body = char::from(b'a' + n).to_string().repeat(64 * 1024);
                format!(r#"{{"state":"{body}"}}"#)
            })
            .collect();

        std::thread::scope(|scope| {
            for payload in &payloads {
                let storage = &storage;
                scope.spawn(move || {
                    for _ in 0..4 {
                        storage.save(keys::CART, payload).unwrap();
                    }
                });
            }
        });

        let stored = storage.load(keys::CART).unwrap().unwrap();
        assert!(payloads.contains(&stored));
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name != "cart-storage.json")
            .collect();
        assert!(leftovers.is_empty(), "stray temp files: {leftovers:?}");
    }

    #[test]
    fn test_keys_are_disjoint() {
        let all = [keys::CART, keys::PRODUCTS, keys::ORDERS, keys::AUTH];
        for (i, a) in all.iter().enumerate() {
            for b in all.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
