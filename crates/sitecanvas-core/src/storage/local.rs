//! Browser `localStorage` store for WASM.

use super::{KeyValueStore, StorageError, StorageResult};
use wasm_bindgen::JsValue;

fn js_error(context: &str, err: JsValue) -> StorageError {
    StorageError::Unavailable(format!("{}: {:?}", context, err))
}

/// Key-value store backed by `window.localStorage`.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Bind to the current window's `localStorage`.
    pub fn new() -> StorageResult<Self> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("No window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| js_error("localStorage access denied", e))?
            .ok_or_else(|| StorageError::Unavailable("localStorage not available".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| js_error("Failed to read", e))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| js_error("Failed to write (quota?)", e))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| js_error("Failed to remove", e))
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let len = self.storage.length().map_err(|e| js_error("Failed to list", e))?;
        let mut keys = Vec::with_capacity(len as usize);
        for index in 0..len {
            if let Some(key) = self.storage.key(index).map_err(|e| js_error("Failed to list", e))? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}
