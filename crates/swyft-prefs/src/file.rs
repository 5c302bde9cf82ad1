//! File-backed key-value store.
//!
//! [`FileStore`] keeps every key in a single JSON object on disk:
//!
//! ```text
//! {
//!   "lastOpenedTab": "java-intro",
//!   "theme": "dark",
//!   "sidebarWidth": "320"
//! }
//! ```
//!
//! The file is read once on construction and rewritten on every change. A
//! change that fails to reach disk is not applied in memory either.
//! A missing or corrupt file starts an empty store; corruption is logged but
//! never fatal.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{KeyValueStore, StoreError};

/// JSON-file [`KeyValueStore`].
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, loading any existing values.
    #[must_use]
    pub fn open(path: PathBuf) -> Self {
        let values = load_values(&path);
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current values to disk.
    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap();
        let mut updated = values.clone();
        updated.insert(key.to_owned(), value.to_owned());
        self.flush(&updated)?;
        *values = updated;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap();
        if !values.contains_key(key) {
            return Ok(());
        }
        let mut updated = values.clone();
        updated.remove(key);
        self.flush(&updated)?;
        *values = updated;
        Ok(())
    }
}

/// Read the backing file, tolerating absence and corruption.
fn load_values(path: &Path) -> BTreeMap<String, String> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no state file, starting empty");
            return BTreeMap::new();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read state file");
            return BTreeMap::new();
        }
    };

    match serde_json::from_str(&text) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "corrupt state file, starting empty");
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_file_store_persists_across_instances() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state/state.json");

        let store = FileStore::open(path.clone());
        store.set("theme", "dark").unwrap();
        store.set("sidebarWidth", "500").unwrap();
        drop(store);

        let reopened = FileStore::open(path);
        assert_eq!(reopened.get("theme").as_deref(), Some("dark"));
        assert_eq!(reopened.get("sidebarWidth").as_deref(), Some("500"));
    }

    #[test]
    fn test_file_store_remove_persists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");

        let store = FileStore::open(path.clone());
        store.set("lastOpenedTab", "intro").unwrap();
        store.remove("lastOpenedTab").unwrap();

        assert_eq!(FileStore::open(path).get("lastOpenedTab"), None);
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();

        let store = FileStore::open(tmp.path().join("nope.json"));

        assert_eq!(store.get("theme"), None);
    }

    #[test]
    fn test_file_store_corrupt_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::open(path);

        assert_eq!(store.get("theme"), None);
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("light"));
    }

    #[test]
    fn test_file_store_failed_write_keeps_old_value() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let store = FileStore::open(blocker.join("state.json"));

        assert!(store.set("theme", "dark").is_err());
        assert_eq!(store.get("theme"), None);
    }

    #[test]
    fn test_file_store_failed_remove_keeps_value() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("state");
        let store = FileStore::open(dir.join("state.json"));
        store.set("theme", "dark").unwrap();

        fs::remove_dir_all(&dir).unwrap();
        fs::write(&dir, "").unwrap();

        assert!(store.remove("theme").is_err());
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }
}
