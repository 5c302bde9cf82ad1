//! Persisted user preferences for SwyftNav.
//!
//! This crate provides a narrow key-value persistence interface that the
//! navigation core depends on, plus a typed facade over the handful of keys
//! the portal remembers between sessions:
//!
//! - [`KeyValueStore`]: `get` / `set` / `remove` on string keys
//! - [`Preferences`]: last opened tab, theme, sidebar width, search query
//!
//! # Implementations
//!
//! - [`MemoryStore`]: in-process map, lost on exit
//! - [`FileStore`]: JSON object file, written through on every `set`
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use swyft_prefs::{MemoryStore, Preferences, Theme};
//!
//! let prefs = Preferences::new(Arc::new(MemoryStore::new()));
//! prefs.set_theme(Theme::Dark).unwrap();
//! assert_eq!(prefs.theme(), Theme::Dark);
//!
//! // Widths are clamped to the sidebar's allowed range before persisting.
//! assert_eq!(prefs.set_sidebar_width(10_000).unwrap(), 600);
//! ```

mod file;
mod preferences;

use std::collections::HashMap;
use std::sync::Mutex;

pub use file::FileStore;
pub use preferences::{
    MAX_SIDEBAR_WIDTH, MIN_SIDEBAR_WIDTH, Preferences, Theme, keys,
};

/// Error writing persisted state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error writing the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Backing file could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value persistence used by the navigation core.
///
/// Reads never fail: an unreadable or missing value is simply absent.
/// Writes are last-write-wins.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory [`KeyValueStore`].
///
/// Used by tests and by callers that don't want anything written to disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}
