//! Key-value storage for persisted blobs.
//!
//! Everything the editors persist (project, flowchart, clipboard) is a JSON
//! string stored under a fixed key. Backends only move strings around; the
//! blob formats live in [`crate::persist`] and [`crate::clipboard`].

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use autosave::{AutoSaveManager, DEFAULT_AUTOSAVE_DEBOUNCE_MS, Duration, Instant};
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Key not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A synchronous string key-value store.
///
/// Browser `localStorage` is synchronous, so the trait is too. On native
/// platforms implementations must be `Send + Sync`.
#[cfg(not(target_arch = "wasm32"))]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// All stored keys.
    fn keys(&self) -> StorageResult<Vec<String>>;

    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// A synchronous string key-value store (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn remove(&self, key: &str) -> StorageResult<()>;

    fn keys(&self) -> StorageResult<Vec<String>>;

    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Create the platform's default store.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_store() -> StorageResult<std::sync::Arc<FileStore>> {
    Ok(std::sync::Arc::new(FileStore::default_location()?))
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_store() -> StorageResult<std::sync::Arc<LocalStorage>> {
    Ok(std::sync::Arc::new(LocalStorage::new()?))
}

/// The store type used by [`create_default_store`].
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStore = FileStore;

#[cfg(target_arch = "wasm32")]
pub type PlatformStore = LocalStorage;
