//! Tab navigation.
//!
//! [`Navigator`] resolves a tab id to a loaded record, loading whatever is
//! needed on the way, and commits the rendered result as the current
//! [`View`].
//!
//! # Ordering
//!
//! Every navigation takes a generation token before its first await. Only a
//! navigation whose token is still the newest when it finishes may commit;
//! older ones return [`NavOutcome::Superseded`] and leave state untouched, so
//! a slow load can never overwrite a later click.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use swyft_prefs::Preferences;

use crate::content::ContentRecord;
use crate::content_index::{ContentIndex, Direction};
use crate::error::SiteError;
use crate::renderer::{RenderedPage, Renderer};
use crate::router::{Route, Router};
use crate::search::{SearchEngine, SearchOutcome, SearchResults};
use crate::sidebar::Sidebar;

/// Upper bound on section-id → first-tab hops while resolving one request.
const MAX_SECTION_HOPS: usize = 4;

/// Committed section and tab.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub section_id: Option<String>,
    pub tab_id: Option<String>,
}

/// Everything a front end needs to draw the current screen.
#[derive(Clone, Debug, Default)]
pub struct View {
    pub page: Option<RenderedPage>,
    pub sidebar: Option<Arc<Sidebar>>,
    /// Dismissible error message.
    pub banner: Option<String>,
    /// Search results shown alongside the page.
    pub search: Option<Arc<SearchResults>>,
    /// Canonical URL of the page.
    pub url: Option<String>,
}

/// Result of a navigation that did not fail.
#[derive(Clone, Debug)]
pub enum NavOutcome {
    Rendered(Arc<View>),
    /// A newer navigation started before this one finished.
    Superseded,
}

impl NavOutcome {
    #[must_use]
    pub fn view(&self) -> Option<&Arc<View>> {
        match self {
            Self::Rendered(view) => Some(view),
            Self::Superseded => None,
        }
    }
}

#[derive(Default)]
struct Inner {
    state: NavigationState,
    view: Arc<View>,
}

/// Resolves and commits navigation requests.
pub struct Navigator {
    index: Arc<ContentIndex>,
    search: Arc<SearchEngine>,
    renderer: Arc<dyn Renderer>,
    prefs: Preferences,
    home_section: String,
    generation: AtomicU64,
    inner: Mutex<Inner>,
}

impl Navigator {
    #[must_use]
    pub fn new(
        index: Arc<ContentIndex>,
        search: Arc<SearchEngine>,
        renderer: Arc<dyn Renderer>,
        prefs: Preferences,
        home_section: &str,
    ) -> Self {
        Self {
            index,
            search,
            renderer,
            prefs,
            home_section: home_section.to_owned(),
            generation: AtomicU64::new(0),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Committed section and tab.
    #[must_use]
    pub fn state(&self) -> NavigationState {
        self.inner.lock().unwrap().state.clone()
    }

    /// Current view.
    #[must_use]
    pub fn view(&self) -> Arc<View> {
        Arc::clone(&self.inner.lock().unwrap().view)
    }

    /// Router built from the root manifest.
    pub async fn router(&self) -> Result<Router, SiteError> {
        let config = self.index.config();
        let root = config.load_root().await?;
        Ok(Router::new(config.base().clone(), &root, &self.home_section))
    }

    fn issue_token(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_newest(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }

    /// Open a tab.
    ///
    /// On failure the error is shown as a banner (unless a newer navigation
    /// has started) and the previous page stays in place.
    pub async fn navigate_to_tab(&self, tab_id: &str) -> Result<NavOutcome, SiteError> {
        let token = self.issue_token();
        self.navigate_with_token(token, tab_id).await
    }

    async fn navigate_with_token(
        &self,
        token: u64,
        tab_id: &str,
    ) -> Result<NavOutcome, SiteError> {
        if !self.is_newest(token) {
            return Ok(NavOutcome::Superseded);
        }
        if let Err(e) = self.prefs.set_last_opened_tab(tab_id) {
            tracing::warn!(tab = tab_id, error = %e, "Failed to persist last opened tab");
        }

        match self.resolve(tab_id).await {
            Ok(record) => self.commit(token, &record).await,
            Err(e) => {
                tracing::warn!(tab = tab_id, error = %e, "Navigation failed");
                self.show_banner_if_newest(token, format!("Could not open \"{tab_id}\": {e}"));
                Err(e)
            }
        }
    }

    /// Find a loaded record for `tab_id`.
    ///
    /// Tries, in order: the loaded tabs; the section declaring the id; a
    /// single-file load; and finally treating the id as a section and
    /// continuing with that section's first tab.
    async fn resolve(&self, tab_id: &str) -> Result<Arc<ContentRecord>, SiteError> {
        let config = self.index.config();
        let mut target = tab_id.to_owned();
        let mut last_error = None;

        for _ in 0..=MAX_SECTION_HOPS {
            if let Some(record) = self.index.loaded(&target) {
                tracing::debug!(tab = %target, "Resolved from loaded tabs");
                return Ok(record);
            }

            if let Some(section) = config.find_owner_section(&target).await? {
                self.index.ensure_loaded(&section).await?;
                if let Some(record) = self.index.loaded(&target) {
                    return Ok(record);
                }
            }

            match self.index.get_or_load_single(&target).await {
                Ok(Some(record)) => return Ok(record),
                Ok(None) => {}
                Err(e) => last_error = Some(e),
            }

            let root = config.load_root().await?;
            if !root.has_section(&target) {
                break;
            }
            self.index.ensure_loaded(&target).await?;
            let section = self.index.register(&target).await?;
            match section.first_tab() {
                Some(first) if first != target => {
                    tracing::debug!(section = %target, tab = first, "Opening section's first tab");
                    target = first.to_owned();
                }
                Some(_) => break,
                None => {
                    return Err(SiteError::NotFound(format!(
                        "section {target} has no content"
                    )));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SiteError::NotFound(tab_id.to_owned())))
    }

    async fn commit(&self, token: u64, record: &ContentRecord) -> Result<NavOutcome, SiteError> {
        // Both are cached by now; neither does I/O.
        let section = self.index.config().section(&record.section_id).await?;
        let router = self.router().await?;

        let page = self.renderer.render(record);
        let search = Some(self.search.current()).filter(|results| !results.is_empty());
        let url = router.url_for(Some(&record.section_id), &record.id);

        let mut inner = self.inner.lock().unwrap();
        if !self.is_newest(token) {
            tracing::debug!(tab = %record.id, "Navigation superseded");
            return Ok(NavOutcome::Superseded);
        }

        let sidebar = if inner.state.section_id.as_deref() == Some(record.section_id.as_str()) {
            inner.view.sidebar.clone()
        } else {
            Some(Arc::new(Sidebar::from_section(&section)))
        };

        inner.state = NavigationState {
            section_id: Some(record.section_id.clone()),
            tab_id: Some(record.id.clone()),
        };
        inner.view = Arc::new(View {
            page: Some(page),
            sidebar,
            banner: None,
            search,
            url: Some(url),
        });
        tracing::info!(tab = %record.id, section = %record.section_id, "Opened tab");

        Ok(NavOutcome::Rendered(Arc::clone(&inner.view)))
    }

    fn show_banner_if_newest(&self, token: u64, message: String) {
        let mut inner = self.inner.lock().unwrap();
        if !self.is_newest(token) {
            return;
        }
        inner.view = Arc::new(View {
            banner: Some(message),
            ..(*inner.view).clone()
        });
    }

    /// Open a section at its first tab.
    pub async fn handle_section_navigation(
        &self,
        section_id: &str,
    ) -> Result<NavOutcome, SiteError> {
        let token = self.issue_token();
        self.open_section(token, section_id).await
    }

    async fn open_section(&self, token: u64, section_id: &str) -> Result<NavOutcome, SiteError> {
        let first = match self.index.register(section_id).await {
            Ok(section) => section.first_tab().map(str::to_owned),
            Err(e) => {
                self.show_banner_if_newest(token, format!("Could not open \"{section_id}\": {e}"));
                return Err(e);
            }
        };

        match first {
            Some(tab) => self.navigate_with_token(token, &tab).await,
            None => {
                let e = SiteError::NotFound(format!("section {section_id} has no content"));
                self.show_banner_if_newest(token, e.to_string());
                Err(e)
            }
        }
    }

    /// Open the page a route points to.
    ///
    /// [`Route::Home`] restores the last opened tab when it still resolves,
    /// else opens the tab flagged `default`, else the home section.
    pub async fn start(&self, route: Route) -> Result<NavOutcome, SiteError> {
        let token = self.issue_token();
        self.open_route(token, route).await
    }

    async fn open_route(&self, token: u64, route: Route) -> Result<NavOutcome, SiteError> {
        match route {
            Route::Tab(tab) | Route::SectionTab { tab, .. } => {
                self.navigate_with_token(token, &tab).await
            }
            Route::Section(section) => self.open_section(token, &section).await,
            Route::Home => self.open_home(token).await,
        }
    }

    async fn open_home(&self, token: u64) -> Result<NavOutcome, SiteError> {
        if let Some(tab) = self.prefs.last_opened_tab() {
            match self.navigate_with_token(token, &tab).await {
                Ok(outcome) => return Ok(outcome),
                Err(_) if !self.is_newest(token) => return Ok(NavOutcome::Superseded),
                Err(e) => {
                    tracing::warn!(%tab, error = %e, "Last opened tab no longer resolves");
                    if let Err(e) = self.prefs.clear_last_opened_tab() {
                        tracing::warn!(error = %e, "Failed to clear last opened tab");
                    }
                }
            }
        }

        if let Some(tab) = self.index.config().find_default_tab().await? {
            return self.navigate_with_token(token, &tab).await;
        }
        self.open_section(token, &self.home_section).await
    }

    /// Follow a link. The site root opens the home section.
    pub async fn navigate_url(&self, url: &str) -> Result<NavOutcome, SiteError> {
        let token = self.issue_token();
        match self.router().await?.parse(url) {
            Route::Home => self.open_section(token, &self.home_section).await,
            route => self.open_route(token, route).await,
        }
    }

    /// Open the next or previous loaded tab, wrapping at the ends.
    pub async fn navigate_relative(&self, direction: Direction) -> Result<NavOutcome, SiteError> {
        let current = self
            .state()
            .tab_id
            .ok_or_else(|| SiteError::NotFound("no tab is open".to_owned()))?;
        let target = self
            .index
            .neighbour(&current, direction)
            .ok_or_else(|| SiteError::NotFound(current.clone()))?;
        self.navigate_to_tab(&target).await
    }

    /// Run a search, remember the query and attach the results to the view.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, SiteError> {
        if let Err(e) = self.prefs.set_search_query(query.trim()) {
            tracing::warn!(error = %e, "Failed to persist search query");
        }

        let outcome = self.search.search(query).await?;
        let attached = match &outcome {
            SearchOutcome::Completed(results) => Some(Some(Arc::clone(results))),
            SearchOutcome::Cleared => Some(None),
            SearchOutcome::Queued => None,
        };
        if let Some(search) = attached {
            let mut inner = self.inner.lock().unwrap();
            inner.view = Arc::new(View {
                search: search.filter(|results| !results.is_empty()),
                ..(*inner.view).clone()
            });
        }
        Ok(outcome)
    }

    /// Hide the error banner.
    pub fn dismiss_banner(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.view.banner.is_some() {
            inner.view = Arc::new(View {
                banner: None,
                ..(*inner.view).clone()
            });
        }
    }
}
