//! Typed facade over the persisted preference keys.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{KeyValueStore, StoreError};

/// Smallest sidebar width in pixels.
pub const MIN_SIDEBAR_WIDTH: u32 = 240;

/// Largest sidebar width in pixels.
pub const MAX_SIDEBAR_WIDTH: u32 = 600;

/// Storage keys, shared with the browser build of the portal.
pub mod keys {
    /// Id of the tab that was open last.
    pub const LAST_OPENED_TAB: &str = "lastOpenedTab";
    /// `light` or `dark`.
    pub const THEME: &str = "theme";
    /// Sidebar width in pixels.
    pub const SIDEBAR_WIDTH: &str = "sidebarWidth";
    /// Query typed into the search box.
    pub const SEARCH_QUERY: &str = "searchQuery";
}

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Stored representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// Typed access to persisted preferences.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    /// Wrap a key-value store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Id of the tab that was open last.
    #[must_use]
    pub fn last_opened_tab(&self) -> Option<String> {
        self.store
            .get(keys::LAST_OPENED_TAB)
            .filter(|id| !id.is_empty())
    }

    /// Remember the tab that is being opened.
    pub fn set_last_opened_tab(&self, tab_id: &str) -> Result<(), StoreError> {
        self.store.set(keys::LAST_OPENED_TAB, tab_id)
    }

    /// Forget the last opened tab.
    pub fn clear_last_opened_tab(&self) -> Result<(), StoreError> {
        self.store.remove(keys::LAST_OPENED_TAB)
    }

    /// Persisted theme; light when unset or unrecognised.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.store
            .get(keys::THEME)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// Persist a theme.
    pub fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.store.set(keys::THEME, theme.as_str())
    }

    /// Switch between light and dark, returning the new theme.
    pub fn toggle_theme(&self) -> Result<Theme, StoreError> {
        let theme = self.theme().toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    /// Persisted sidebar width, if one within the allowed range is stored.
    #[must_use]
    pub fn sidebar_width(&self) -> Option<u32> {
        self.store
            .get(keys::SIDEBAR_WIDTH)
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|width| (MIN_SIDEBAR_WIDTH..=MAX_SIDEBAR_WIDTH).contains(width))
    }

    /// Clamp and persist a sidebar width, returning the stored value.
    pub fn set_sidebar_width(&self, width: u32) -> Result<u32, StoreError> {
        let clamped = width.clamp(MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH);
        self.store
            .set(keys::SIDEBAR_WIDTH, &clamped.to_string())?;
        Ok(clamped)
    }

    /// Query typed into the search box.
    #[must_use]
    pub fn search_query(&self) -> Option<String> {
        self.store.get(keys::SEARCH_QUERY)
    }

    /// Persist the search query; an empty query clears it.
    pub fn set_search_query(&self, query: &str) -> Result<(), StoreError> {
        if query.is_empty() {
            self.store.remove(keys::SEARCH_QUERY)
        } else {
            self.store.set(keys::SEARCH_QUERY, query)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::{FileStore, MemoryStore};

    fn memory_prefs() -> Preferences {
        Preferences::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_theme_defaults_to_light() {
        assert_eq!(memory_prefs().theme(), Theme::Light);
    }

    #[test]
    fn test_dark_theme_survives_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");

        Preferences::new(Arc::new(FileStore::open(path.clone())))
            .set_theme(Theme::Dark)
            .unwrap();
        let reloaded = Preferences::new(Arc::new(FileStore::open(path)));

        assert_eq!(reloaded.theme(), Theme::Dark);
    }

    #[test]
    fn test_toggle_theme() {
        let prefs = memory_prefs();

        assert_eq!(prefs.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(prefs.toggle_theme().unwrap(), Theme::Light);
    }

    #[test]
    fn test_unknown_theme_reads_as_light() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::THEME, "solarized").unwrap();

        assert_eq!(Preferences::new(store).theme(), Theme::Light);
    }

    #[test]
    fn test_sidebar_width_round_trip_across_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");

        let stored = Preferences::new(Arc::new(FileStore::open(path.clone())))
            .set_sidebar_width(500)
            .unwrap();
        let reloaded = Preferences::new(Arc::new(FileStore::open(path)));

        assert_eq!(stored, 500);
        assert_eq!(reloaded.sidebar_width(), Some(500));
    }

    #[test]
    fn test_sidebar_width_clamped_before_persisting() {
        let store = Arc::new(MemoryStore::new());
        let prefs = Preferences::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);

        assert_eq!(prefs.set_sidebar_width(10_000).unwrap(), 600);
        assert_eq!(store.get(keys::SIDEBAR_WIDTH).as_deref(), Some("600"));

        assert_eq!(prefs.set_sidebar_width(10).unwrap(), 240);
        assert_eq!(prefs.sidebar_width(), Some(240));
    }

    #[test]
    fn test_out_of_range_stored_width_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::SIDEBAR_WIDTH, "9000").unwrap();

        assert_eq!(Preferences::new(store).sidebar_width(), None);
    }

    #[test]
    fn test_search_query_empty_clears() {
        let prefs = memory_prefs();

        prefs.set_search_query("loops").unwrap();
        assert_eq!(prefs.search_query().as_deref(), Some("loops"));

        prefs.set_search_query("").unwrap();
        assert_eq!(prefs.search_query(), None);
    }

    #[test]
    fn test_last_opened_tab_round_trip() {
        let prefs = memory_prefs();

        prefs.set_last_opened_tab("java-intro").unwrap();
        assert_eq!(prefs.last_opened_tab().as_deref(), Some("java-intro"));

        prefs.clear_last_opened_tab().unwrap();
        assert_eq!(prefs.last_opened_tab(), None);
    }
}
