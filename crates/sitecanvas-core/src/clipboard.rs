//! Single-entry element clipboard stored in the key-value store.
//!
//! The clipboard survives reloads because it lives in the same store as the
//! project, but it expires after a day.

use crate::elements::Element;
use crate::storage::{KeyValueStore, StorageError};
use chrono::{DateTime, Duration, Utc};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key of the clipboard blob.
pub const CLIPBOARD_KEY: &str = "sitecanvas-clipboard";
/// Clipboard blob format version.
pub const CLIPBOARD_VERSION: u32 = 1;
/// How long copied data stays pasteable, in milliseconds.
pub const CLIPBOARD_TTL_MS: i64 = 24 * 60 * 60 * 1000;
/// Offset of the first pasted element.
pub const PASTE_OFFSET: f64 = 20.0;
/// Extra offset per subsequent pasted element.
pub const PASTE_STEP: f64 = 10.0;

const BLOB_KIND: &str = "elements";

/// The stored clipboard payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardBlob {
    pub version: u32,
    pub elements: Vec<Element>,
    /// Copy time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("No elements to paste")]
    Empty,
    #[error("Copied data is too old")]
    Expired,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ClipboardResult<T> = Result<T, ClipboardError>;

/// Copy/paste of elements through a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct Clipboard {
    ttl: Duration,
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard {
    pub fn new() -> Self {
        Self::with_ttl(Duration::milliseconds(CLIPBOARD_TTL_MS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store `elements`, replacing whatever was copied before.
    pub fn copy<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        elements: &[Element],
        now: DateTime<Utc>,
    ) -> ClipboardResult<()> {
        if elements.is_empty() {
            return Err(ClipboardError::Empty);
        }
        let blob = ClipboardBlob {
            version: CLIPBOARD_VERSION,
            elements: elements.to_vec(),
            timestamp: now.timestamp_millis(),
            kind: BLOB_KIND.to_string(),
        };
        store.set(CLIPBOARD_KEY, &serde_json::to_string(&blob)?)?;
        log::debug!("Copied {} element(s)", elements.len());
        Ok(())
    }

    /// Read the clipboard and produce fresh copies ready to insert.
    ///
    /// Each copy gets a new id, fresh timestamps and an offset of
    /// `20 + i * 10` on both axes. Expired data is removed from the store.
    pub fn paste<S: KeyValueStore + ?Sized>(&self, store: &S, now: DateTime<Utc>) -> ClipboardResult<Vec<Element>> {
        let Some(raw) = store.get(CLIPBOARD_KEY)? else {
            return Err(ClipboardError::Empty);
        };
        let blob: ClipboardBlob = match serde_json::from_str(&raw) {
            Ok(blob) => blob,
            Err(e) => {
                log::warn!("Ignoring unreadable clipboard blob: {}", e);
                return Err(ClipboardError::Empty);
            }
        };

        if now.timestamp_millis() - blob.timestamp > self.ttl.num_milliseconds() {
            store.remove(CLIPBOARD_KEY)?;
            log::info!("Clipboard data expired");
            return Err(ClipboardError::Expired);
        }
        if blob.elements.is_empty() {
            return Err(ClipboardError::Empty);
        }

        Ok(blob
            .elements
            .iter()
            .enumerate()
            .map(|(i, element)| {
                let offset = PASTE_OFFSET + i as f64 * PASTE_STEP;
                element.duplicate(Vec2::new(offset, offset), now)
            })
            .collect())
    }

    /// Whether something pasteable is stored (ignores expiry).
    pub fn has_content<S: KeyValueStore + ?Sized>(&self, store: &S) -> bool {
        store.contains(CLIPBOARD_KEY).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementType;
    use crate::storage::MemoryStore;
    use kurbo::Point;

    fn copied_at(store: &MemoryStore, count: usize, at: DateTime<Utc>) -> Vec<Element> {
        let elements: Vec<Element> = (0..count)
            .map(|i| Element::new(ElementType::Button, Point::new(100.0 * i as f64, 0.0), at))
            .collect();
        Clipboard::new().copy(store, &elements, at).unwrap();
        elements
    }

    #[test]
    fn test_paste_within_ttl_offsets_and_regenerates_ids() {
        let store = MemoryStore::new();
        let t0 = Utc::now();
        let originals = copied_at(&store, 2, t0);

        let later = t0 + Duration::hours(23) + Duration::minutes(59);
        let pasted = Clipboard::new().paste(&store, later).unwrap();

        assert_eq!(pasted.len(), 2);
        assert_ne!(pasted[0].id(), originals[0].id());
        assert_eq!(pasted[0].position(), Point::new(20.0, 20.0));
        assert_eq!(pasted[1].position(), Point::new(130.0, 30.0));
        assert_eq!(pasted[0].metadata.created, later);
        assert!(store.contains(CLIPBOARD_KEY).unwrap());
    }

    #[test]
    fn test_expired_clipboard_is_removed() {
        let store = MemoryStore::new();
        let t0 = Utc::now();
        copied_at(&store, 1, t0);

        let later = t0 + Duration::milliseconds(CLIPBOARD_TTL_MS + 1);
        let err = Clipboard::new().paste(&store, later).unwrap_err();

        assert!(matches!(err, ClipboardError::Expired));
        assert_eq!(err.to_string(), "Copied data is too old");
        assert!(!store.contains(CLIPBOARD_KEY).unwrap());
    }

    #[test]
    fn test_exactly_ttl_is_still_valid() {
        let store = MemoryStore::new();
        let t0 = Utc::now();
        copied_at(&store, 1, t0);

        let at_limit = t0 + Duration::milliseconds(CLIPBOARD_TTL_MS);
        assert!(Clipboard::new().paste(&store, at_limit).is_ok());
    }

    #[test]
    fn test_empty_and_garbage_clipboard() {
        let store = MemoryStore::new();
        let err = Clipboard::new().paste(&store, Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "No elements to paste");

        store.set(CLIPBOARD_KEY, "not json").unwrap();
        assert!(matches!(Clipboard::new().paste(&store, Utc::now()), Err(ClipboardError::Empty)));
    }

    #[test]
    fn test_blob_shape() {
        let store = MemoryStore::new();
        copied_at(&store, 1, Utc::now());
        let raw: serde_json::Value = serde_json::from_str(&store.get(CLIPBOARD_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw["type"], "elements");
        assert_eq!(raw["version"], 1);
        assert!(raw["timestamp"].is_i64());
    }
}
