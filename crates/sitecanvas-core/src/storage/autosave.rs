//! Debounced auto-save.
//!
//! Every change resets the timer; a save happens once the debounce interval
//! has elapsed since the last change, so a burst of edits is written once.

use super::{KeyValueStore, StorageResult};
use serde::Serialize;
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
pub use web_time::{Duration, Instant};

/// Default quiet period before an auto-save, in milliseconds.
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 1000;

/// Writes a blob to a fixed key once changes settle.
pub struct AutoSaveManager<S: KeyValueStore> {
    storage: Arc<S>,
    key: String,
    debounce: Duration,
    /// Time of the most recent unsaved change.
    last_change: Option<Instant>,
    dirty: bool,
    enabled: bool,
}

impl<S: KeyValueStore> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            debounce: Duration::from_millis(DEFAULT_AUTOSAVE_DEBOUNCE_MS),
            last_change: None,
            dirty: false,
            enabled: true,
        }
    }

    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Turn auto-saving on or off. Explicit [`save`](Self::save) still works.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Record a change now.
    pub fn mark_dirty(&mut self) {
        self.mark_dirty_at(Instant::now());
    }

    /// Record a change at `now`, restarting the debounce timer.
    pub fn mark_dirty_at(&mut self, now: Instant) {
        self.dirty = true;
        self.last_change = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn should_save(&self) -> bool {
        self.should_save_at(Instant::now())
    }

    /// Whether the debounce interval has passed since the last change.
    pub fn should_save_at(&self, now: Instant) -> bool {
        if !self.enabled || !self.dirty {
            return false;
        }
        match self.last_change {
            Some(last) => now.saturating_duration_since(last) >= self.debounce,
            None => true,
        }
    }

    /// Save `value` if the debounce interval has passed. Returns true if a
    /// save was performed.
    pub fn maybe_save<T: Serialize>(&mut self, value: &T) -> StorageResult<bool> {
        self.maybe_save_at(value, Instant::now())
    }

    pub fn maybe_save_at<T: Serialize>(&mut self, value: &T, now: Instant) -> StorageResult<bool> {
        if !self.should_save_at(now) {
            return Ok(false);
        }
        self.save(value)?;
        Ok(true)
    }

    /// Serialize and write `value` immediately.
    pub fn save<T: Serialize>(&mut self, value: &T) -> StorageResult<()> {
        let json = serde_json::to_string(value)?;
        self.storage.set(&self.key, &json)?;
        log::debug!("Saved {} ({} bytes)", self.key, json.len());

        self.dirty = false;
        self.last_change = None;
        Ok(())
    }

    /// Read the raw stored blob, if any.
    pub fn load_raw(&self) -> StorageResult<Option<String>> {
        self.storage.get(&self.key)
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn manager() -> AutoSaveManager<MemoryStore> {
        AutoSaveManager::new(Arc::new(MemoryStore::new()), "doc")
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_clean_manager_does_not_save() {
        let manager = manager();
        assert!(!manager.is_dirty());
        assert!(!manager.should_save());
    }

    #[test]
    fn test_burst_of_changes_saves_once() {
        let mut manager = manager();
        let t0 = Instant::now();

        manager.mark_dirty_at(t0);
        manager.mark_dirty_at(t0 + ms(400));
        manager.mark_dirty_at(t0 + ms(800));

        assert!(!manager.maybe_save_at(&"v1", t0 + ms(1200)).unwrap());
        assert!(manager.maybe_save_at(&"v1", t0 + ms(1800)).unwrap());
        assert!(!manager.maybe_save_at(&"v1", t0 + ms(5000)).unwrap());

        assert_eq!(manager.load_raw().unwrap().as_deref(), Some("\"v1\""));
    }

    #[test]
    fn test_disabled_manager_skips_auto_save() {
        let mut manager = manager();
        manager.set_enabled(false);
        let t0 = Instant::now();
        manager.mark_dirty_at(t0);

        assert!(!manager.maybe_save_at(&1, t0 + ms(2000)).unwrap());
        assert!(manager.is_dirty());

        manager.save(&1).unwrap();
        assert!(!manager.is_dirty());
        assert_eq!(manager.load_raw().unwrap().as_deref(), Some("1"));
    }
}
