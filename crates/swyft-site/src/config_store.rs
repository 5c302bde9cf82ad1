//! Manifest loading and caching.
//!
//! [`ConfigStore`] fetches the root manifest once and each section manifest
//! on first use, resolving every relative file reference against the hosting
//! [`BasePath`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use swyft_storage::ContentSource;

use crate::content::ContentBody;
use crate::error::SiteError;
use crate::manifest::{RootManifest, SectionManifest, merge_section};

/// Path prefix the site is served under: `/` for a user site, `/<repo>/` for
/// a project site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasePath(String);

impl Default for BasePath {
    fn default() -> Self {
        Self::root()
    }
}

impl BasePath {
    /// The `/` base.
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_owned())
    }

    /// Normalize to a leading and trailing slash.
    #[must_use]
    pub fn new(path: &str) -> Self {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            Self::root()
        } else {
            Self(format!("/{trimmed}/"))
        }
    }

    /// Derive the base from a page pathname.
    ///
    /// The first path segment is the base unless it looks like a file (has a
    /// `.`) or a fragment, so `/docs/java/intro` gives `/docs/` while
    /// `/index.html` and `/` give `/`.
    #[must_use]
    pub fn detect(pathname: &str) -> Self {
        match pathname.split('/').find(|s| !s.is_empty()) {
            Some(first) if !first.contains('.') && !first.contains('#') => {
                Self(format!("/{first}/"))
            }
            _ => Self::root(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve a site-relative reference to a path under this base.
    ///
    /// Absolute URLs and paths already under the base are returned as-is.
    #[must_use]
    pub fn resolve(&self, relative: &str) -> String {
        if relative.starts_with("http://") || relative.starts_with("https://") {
            return relative.to_owned();
        }
        if self.0 != "/" && relative.starts_with(&self.0) {
            return relative.to_owned();
        }
        let trimmed = relative.trim_start_matches("./").trim_start_matches('/');
        format!("{}{trimmed}", self.0)
    }

    /// Strip the base from a request pathname, returning the site-relative rest.
    #[must_use]
    pub fn strip<'a>(&self, pathname: &'a str) -> &'a str {
        let base = self.0.trim_end_matches('/');
        if base.is_empty() {
            return pathname;
        }
        match pathname.strip_prefix(base) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => pathname,
        }
    }
}

/// Loads and caches manifests.
pub struct ConfigStore {
    source: Arc<dyn ContentSource>,
    base: BasePath,
    manifest_path: String,
    /// Serializes the first root load.
    root: tokio::sync::Mutex<Option<Arc<RootManifest>>>,
    sections: Mutex<HashMap<String, Arc<SectionManifest>>>,
}

impl ConfigStore {
    /// Create a store reading `manifest_path` (relative to `base`) from `source`.
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>, base: BasePath, manifest_path: &str) -> Self {
        Self {
            source,
            base,
            manifest_path: manifest_path.to_owned(),
            root: tokio::sync::Mutex::new(None),
            sections: Mutex::new(HashMap::new()),
        }
    }

    /// Hosting base path.
    #[must_use]
    pub fn base(&self) -> &BasePath {
        &self.base
    }

    /// Resolve a site-relative reference against the base path.
    #[must_use]
    pub fn resolve_path(&self, relative: &str) -> String {
        self.base.resolve(relative)
    }

    /// Fetch a document's text, mapping source failures to [`SiteError::Network`].
    async fn fetch_text(&self, relative: &str) -> Result<String, SiteError> {
        let path = self.resolve_path(relative);
        self.source
            .fetch(&path)
            .await
            .map_err(|source| SiteError::Network { path, source })
    }

    /// Load the root manifest, fetching it on first use.
    pub async fn load_root(&self) -> Result<Arc<RootManifest>, SiteError> {
        let mut slot = self.root.lock().await;
        if let Some(root) = slot.as_ref() {
            return Ok(Arc::clone(root));
        }

        let text = self.fetch_text(&self.manifest_path).await?;
        let root = Arc::new(RootManifest::parse(&text, &self.manifest_path)?);
        tracing::info!(
            path = %self.manifest_path,
            sections = root.section_ids().count(),
            "Loaded root manifest"
        );
        *slot = Some(Arc::clone(&root));
        Ok(root)
    }

    /// Section manifest if it has already been loaded.
    #[must_use]
    pub fn cached_section(&self, id: &str) -> Option<Arc<SectionManifest>> {
        self.sections.lock().unwrap().get(id).cloned()
    }

    /// Load a section manifest, fetching its `file` when the root entry does
    /// not declare the structure inline.
    pub async fn section(&self, id: &str) -> Result<Arc<SectionManifest>, SiteError> {
        if let Some(section) = self.cached_section(id) {
            tracing::debug!(section = id, "Section manifest cache hit");
            return Ok(section);
        }

        let root = self.load_root().await?;
        let entry = root
            .entry(id)
            .cloned()
            .ok_or_else(|| SiteError::NotFound(format!("section {id}")))?;
        let inline = SectionManifest::from_object(id, entry.clone())?;

        let section = match inline.file.as_deref() {
            Some(file) if inline.needs_fetch() => {
                let path = self.resolve_path(file);
                let text = self.fetch_text(file).await?;
                let fetched: Value = serde_json::from_str(&text)
                    .map_err(|source| SiteError::Parse { path: path.clone(), source })?;
                let Value::Object(fetched) = fetched else {
                    return Err(SiteError::Manifest(format!("{path} is not a JSON object")));
                };

                let structural = ["groups", "intro", "children"]
                    .iter()
                    .any(|key| fetched.contains_key(*key));
                if !structural && ContentBody::is_body(&fetched) {
                    let body = ContentBody::from_value(Value::Object(fetched))
                        .map_err(|source| SiteError::Parse { path, source })?;
                    SectionManifest::standalone(id, entry, body)?
                } else {
                    SectionManifest::from_object(id, merge_section(entry, fetched))?
                }
            }
            _ => inline,
        };

        let section = Arc::new(section);
        self.sections
            .lock()
            .unwrap()
            .insert(id.to_owned(), Arc::clone(&section));
        Ok(section)
    }

    /// Fetch and parse a content file.
    pub async fn load_content(&self, file: &str) -> Result<ContentBody, SiteError> {
        let text = self.fetch_text(file).await?;
        ContentBody::parse(&text).map_err(|source| SiteError::Parse {
            path: self.resolve_path(file),
            source,
        })
    }

    /// Find the section declaring `tab_id`.
    ///
    /// Cached manifests are searched first; the remaining sections are then
    /// loaded in declaration order. Sections that fail to load are logged and
    /// skipped.
    pub async fn find_owner_section(&self, tab_id: &str) -> Result<Option<String>, SiteError> {
        let root = self.load_root().await?;

        let mut uncached = Vec::new();
        for id in root.section_ids() {
            match self.cached_section(id) {
                Some(section) if section.contains(tab_id) => return Ok(Some(id.to_owned())),
                Some(_) => {}
                None => uncached.push(id.to_owned()),
            }
        }

        for id in uncached {
            match self.section(&id).await {
                Ok(section) if section.contains(tab_id) => return Ok(Some(id)),
                Ok(_) => {}
                Err(e) => tracing::warn!(section = %id, error = %e, "Skipping section during lookup"),
            }
        }

        Ok(None)
    }

    /// Find the first entry flagged `default`, loading sections as needed.
    pub async fn find_default_tab(&self) -> Result<Option<String>, SiteError> {
        let root = self.load_root().await?;
        for id in root.section_ids() {
            match self.section(id).await {
                Ok(section) => {
                    if let Some(tab) = section.default_tab() {
                        return Ok(Some(tab.to_owned()));
                    }
                }
                Err(e) => tracing::warn!(section = id, error = %e, "Skipping section during lookup"),
            }
        }
        Ok(None)
    }

    /// Drop cached section manifests. The root manifest stays cached.
    pub fn clear(&self) {
        self.sections.lock().unwrap().clear();
    }
}
