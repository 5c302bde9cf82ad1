//! Wiring of the loading, search and navigation layers.
//!
//! [`Site`] owns one instance of each layer, built over a single
//! [`ContentSource`]. All of them share the same [`ContentIndex`], so pages
//! loaded for a search are immediately available to navigation and the other
//! way round.
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use swyft_prefs::{MemoryStore, Preferences};
//! use swyft_site::{Site, SiteOptions};
//! use swyft_storage::FsSource;
//!
//! let source = Arc::new(FsSource::new(PathBuf::from("public")));
//! let prefs = Preferences::new(Arc::new(MemoryStore::new()));
//! let site = Site::new(source, SiteOptions::default(), prefs);
//!
//! site.navigator().navigate_to_tab("java-intro").await?;
//! let results = site.search().search("loop").await?;
//! ```

use std::sync::Arc;

use swyft_prefs::Preferences;
use swyft_storage::ContentSource;

use crate::config_store::{BasePath, ConfigStore};
use crate::content_index::ContentIndex;
use crate::navigator::Navigator;
use crate::renderer::{HtmlRenderer, Renderer};
use crate::search::{SearchEngine, SearchSettings};

/// Options for [`Site`].
#[derive(Clone, Debug)]
pub struct SiteOptions {
    /// Root manifest location, relative to the base path.
    pub manifest_path: String,
    pub base_path: BasePath,
    /// Section opened for the site root when nothing else applies.
    pub home_section: String,
    /// Suffix of every document title.
    pub site_name: String,
    pub search: SearchSettings,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            manifest_path: "data/config/config.json".to_owned(),
            base_path: BasePath::root(),
            home_section: "homepage".to_owned(),
            site_name: "SwyftNav".to_owned(),
            search: SearchSettings::default(),
        }
    }
}

/// The portal core: manifests, content, search and navigation.
pub struct Site {
    config: Arc<ConfigStore>,
    index: Arc<ContentIndex>,
    search: Arc<SearchEngine>,
    navigator: Navigator,
    prefs: Preferences,
}

impl Site {
    /// Build a site rendering with [`HtmlRenderer`].
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>, options: SiteOptions, prefs: Preferences) -> Self {
        let renderer = Arc::new(HtmlRenderer::new(options.site_name.clone()));
        Self::with_renderer(source, options, prefs, renderer)
    }

    /// Build a site with a custom renderer.
    #[must_use]
    pub fn with_renderer(
        source: Arc<dyn ContentSource>,
        options: SiteOptions,
        prefs: Preferences,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        tracing::debug!(
            backend = source.backend(),
            base = options.base_path.as_str(),
            manifest = %options.manifest_path,
            "Creating site"
        );
        let config = Arc::new(ConfigStore::new(
            source,
            options.base_path,
            &options.manifest_path,
        ));
        let index = Arc::new(ContentIndex::new(Arc::clone(&config)));
        let search = Arc::new(SearchEngine::new(Arc::clone(&index), options.search));
        let navigator = Navigator::new(
            Arc::clone(&index),
            Arc::clone(&search),
            renderer,
            prefs.clone(),
            &options.home_section,
        );

        Self {
            config,
            index,
            search,
            navigator,
            prefs,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    #[must_use]
    pub fn index(&self) -> &Arc<ContentIndex> {
        &self.index
    }

    #[must_use]
    pub fn search(&self) -> &Arc<SearchEngine> {
        &self.search
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[must_use]
    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    /// Drop every cached manifest and page.
    pub fn clear_cache(&self) {
        self.search.clear();
        self.index.clear();
    }
}
