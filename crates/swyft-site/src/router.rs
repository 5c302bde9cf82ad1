//! URL parsing and generation.
//!
//! Three URL shapes reach the portal:
//!
//! - `/<base>/?redirect=/java/loops`: forwarded by the static host's 404 page
//! - `/<base>/#loops`: hash links from older pages
//! - `/<base>/java/loops` and `/<base>/java`: path links
//!
//! The redirect parameter wins over the fragment, which wins over the path.

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::config_store::BasePath;
use crate::manifest::RootManifest;

/// Characters escaped in a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Where a URL points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// Site root: restore the last tab or open the default.
    Home,
    /// A tab whose section is unknown until resolved.
    Tab(String),
    /// A section without a tab: open its first tab.
    Section(String),
    SectionTab { section: String, tab: String },
}

/// Maps URLs to routes and back using the root manifest's section slugs.
#[derive(Clone, Debug)]
pub struct Router {
    base: BasePath,
    /// `(slug, section id)` in declaration order.
    slugs: Vec<(String, String)>,
    home_section: String,
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Drop `scheme://host` from an absolute URL.
fn path_part(url: &str) -> &str {
    match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("/", |i| &rest[i..]),
        None => url,
    }
}

impl Router {
    #[must_use]
    pub fn new(base: BasePath, root: &RootManifest, home_section: &str) -> Self {
        Self {
            base,
            slugs: root.slugs(),
            home_section: home_section.to_owned(),
        }
    }

    fn section_for_slug(&self, slug: &str) -> Option<&str> {
        self.slugs
            .iter()
            .find(|(s, _)| s == slug)
            .map(|(_, id)| id.as_str())
    }

    fn slug_for_section(&self, section: &str) -> Option<&str> {
        self.slugs
            .iter()
            .find(|(_, id)| id == section)
            .map(|(slug, _)| slug.as_str())
    }

    /// Parse a URL or pathname into a route.
    #[must_use]
    pub fn parse(&self, url: &str) -> Route {
        let url = path_part(url.trim());
        let (rest, fragment) = url.split_once('#').unwrap_or((url, ""));
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        let redirect = query
            .split('&')
            .find_map(|pair| pair.strip_prefix("redirect="))
            .map(decode)
            .filter(|target| !target.is_empty());
        if let Some(target) = redirect {
            tracing::debug!(%target, "Following redirect parameter");
            return self.parse_path(&target);
        }

        let fragment = decode(fragment);
        if !fragment.is_empty() {
            return Route::Tab(fragment);
        }

        self.parse_path(path)
    }

    fn parse_path(&self, path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<String> = self
            .base
            .strip(path)
            .split('/')
            .filter(|s| !s.is_empty() && *s != "index.html")
            .map(decode)
            .collect();

        match segments.as_slice() {
            [] => Route::Home,
            [slug] => match self.section_for_slug(slug) {
                Some(section) => Route::Section(section.to_owned()),
                None => Route::Tab(slug.clone()),
            },
            [slug, tab] => match self.section_for_slug(slug) {
                Some(section) => Route::SectionTab {
                    section: section.to_owned(),
                    tab: tab.clone(),
                },
                None => Route::Tab(tab.clone()),
            },
            [.., last] => Route::Tab(last.clone()),
        }
    }

    /// Canonical URL for a tab.
    ///
    /// The home section maps to the base itself; other known sections to
    /// `{base}{slug}/{tab}`; tabs of unknown sections fall back to a fragment.
    #[must_use]
    pub fn url_for(&self, section: Option<&str>, tab: &str) -> String {
        let base = self.base.as_str();
        if section == Some(self.home_section.as_str()) {
            return base.to_owned();
        }
        match section.and_then(|s| self.slug_for_section(s)) {
            Some(slug) => format!(
                "{base}{}/{}",
                utf8_percent_encode(slug, SEGMENT),
                utf8_percent_encode(tab, SEGMENT)
            ),
            None => format!("{base}#{}", utf8_percent_encode(tab, SEGMENT)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn router(base: &str) -> Router {
        let root = RootManifest::parse(
            r#"{"sections": {
                "homepage": {"label": "Home", "file": "data/home.json"},
                "java": {"label": "Java", "file": "data/java.json"},
                "cpp": {"label": "C++", "path": "c-plus-plus", "file": "data/cpp.json"}
            }}"#,
            "config.json",
        )
        .unwrap();
        Router::new(BasePath::new(base), &root, "homepage")
    }

    fn tab(section: &str, tab: &str) -> Route {
        Route::SectionTab {
            section: section.to_owned(),
            tab: tab.to_owned(),
        }
    }

    #[test]
    fn test_parse_root_is_home() {
        let router = router("/");

        assert_eq!(router.parse("/"), Route::Home);
        assert_eq!(router.parse("/index.html"), Route::Home);
        assert_eq!(router.parse("https://example.com"), Route::Home);
    }

    #[test]
    fn test_parse_path_forms() {
        let router = router("/");

        assert_eq!(router.parse("/java/loops"), tab("java", "loops"));
        assert_eq!(router.parse("/c-plus-plus/pointers"), tab("cpp", "pointers"));
        assert_eq!(router.parse("/java"), Route::Section("java".to_owned()));
        assert_eq!(router.parse("/loops"), Route::Tab("loops".to_owned()));
    }

    #[test]
    fn test_parse_hash() {
        let router = router("/");

        assert_eq!(router.parse("/#loops"), Route::Tab("loops".to_owned()));
        assert_eq!(router.parse("/java#loops"), Route::Tab("loops".to_owned()));
    }

    #[test]
    fn test_redirect_wins_over_hash() {
        let router = router("/docs/");

        assert_eq!(
            router.parse("https://example.github.io/docs/?redirect=%2Fdocs%2Fjava%2Floops#vars"),
            tab("java", "loops")
        );
    }

    #[test]
    fn test_parse_strips_base() {
        let router = router("/docs/");

        assert_eq!(router.parse("/docs/java/loops"), tab("java", "loops"));
        assert_eq!(router.parse("/docs/"), Route::Home);
    }

    #[test]
    fn test_url_for() {
        let router = router("/docs/");

        assert_eq!(router.url_for(Some("java"), "loops"), "/docs/java/loops");
        assert_eq!(router.url_for(Some("cpp"), "a b"), "/docs/c-plus-plus/a%20b");
        assert_eq!(router.url_for(Some("homepage"), "homepage"), "/docs/");
        assert_eq!(router.url_for(None, "loops"), "/docs/#loops");
    }

    #[test]
    fn test_url_round_trip() {
        let router = router("/docs/");

        for (section, id) in [("java", "loops"), ("cpp", "smart pointers")] {
            let url = router.url_for(Some(section), id);
            assert_eq!(router.parse(&url), tab(section, id));
        }
        assert_eq!(
            router.parse(&router.url_for(None, "loops")),
            Route::Tab("loops".to_owned())
        );
    }
}
