//! Building a [`Site`] from configuration and command-line options.

use std::sync::Arc;

use swyft_config::{CliSettings, Config, ContentLocation};
use swyft_prefs::{FileStore, Preferences};
use swyft_site::{BasePath, SearchSettings, Site, SiteOptions};
use swyft_storage::{ContentSource, FsSource, HttpSource};

use crate::GlobalArgs;
use crate::error::CliError;

/// Load configuration with CLI overrides applied.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config, CliError> {
    let cli_settings = CliSettings {
        source: global.source.clone(),
        base_path: global.base_path.clone(),
        state_dir: global.state_dir.clone(),
        cache_bust: global.no_cache_bust.then_some(false),
    };
    Ok(Config::load(global.config.as_deref(), Some(&cli_settings))?)
}

/// Preferences persisted in the configured state directory.
pub(crate) fn preferences(config: &Config) -> Preferences {
    Preferences::new(Arc::new(FileStore::open(config.state_file())))
}

/// Split `https://host/repo/` into `("https://host", "/repo/")`.
fn split_origin(url: &str) -> (&str, &str) {
    let after_scheme = url.find("://").map_or(0, |i| i + 3);
    match url[after_scheme..].find('/') {
        Some(i) => url.split_at(after_scheme + i),
        None => (url, "/"),
    }
}

/// Content source and the base path it implies.
///
/// A remote URL with a path (`https://user.github.io/repo`) is a project
/// site whose base is that path; a local directory mirrors the web root.
fn content_source(config: &Config) -> (Arc<dyn ContentSource>, BasePath) {
    match &config.site_resolved.source {
        ContentLocation::Directory(dir) => {
            (Arc::new(FsSource::new(dir.clone())), BasePath::root())
        }
        ContentLocation::Remote(url) => {
            let (origin, path) = split_origin(url);
            let source = HttpSource::new(origin).with_cache_bust(config.site_resolved.cache_bust);
            (Arc::new(source), BasePath::detect(path))
        }
    }
}

/// Build the site described by `config`.
pub(crate) fn open_site(config: &Config) -> Site {
    let (source, detected) = content_source(config);
    let site = &config.site_resolved;
    let base_path = site.base_path.as_deref().map_or(detected, BasePath::new);
    tracing::debug!(
        source = ?site.source,
        base = base_path.as_str(),
        config = ?config.config_path,
        "Opening site"
    );

    let options = SiteOptions {
        manifest_path: site.manifest.clone(),
        base_path,
        home_section: site.home_section.clone(),
        site_name: site.name.clone(),
        search: SearchSettings {
            preview_limit: config.search.preview_limit,
            body_context: config.search.body_context,
            code_context: config.search.code_context,
            list_context: config.search.list_context,
        },
    };
    Site::new(source, options, preferences(config))
}
