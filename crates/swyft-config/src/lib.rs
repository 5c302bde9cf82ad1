//! Configuration management for SwyftNav.
//!
//! Parses `swyft.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.source`
//! - `site.base_path`
//! - `state.dir`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content source (directory or `http(s)://` origin).
    pub source: Option<String>,
    /// Override hosting base path.
    pub base_path: Option<String>,
    /// Override state directory.
    pub state_dir: Option<PathBuf>,
    /// Override cache-busting flag.
    pub cache_bust: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "swyft.toml";

/// Default root manifest location, relative to the base path.
const DEFAULT_MANIFEST: &str = "data/config/config.json";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site configuration (source is a relative string from TOML).
    #[serde(default)]
    site: SiteConfigRaw,
    /// Search configuration.
    pub search: SearchConfig,
    /// Persisted state configuration.
    #[serde(default)]
    state: StateConfigRaw,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Resolved state directory (set after loading).
    #[serde(skip)]
    pub state_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    #[allow(clippy::derivable_impls)]
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw site configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    source: Option<String>,
    manifest: Option<String>,
    base_path: Option<String>,
    home_section: Option<String>,
    cache_bust: Option<bool>,
    name: Option<String>,
}

/// Where the static site files are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLocation {
    /// Local directory that mirrors the web root.
    Directory(PathBuf),
    /// Web origin such as `https://example.github.io`.
    Remote(String),
}

impl ContentLocation {
    /// Classify a source string. URLs become [`ContentLocation::Remote`],
    /// anything else a directory relative to `base`.
    #[must_use]
    pub fn parse(source: &str, base: &Path) -> Self {
        if is_http_url(source) {
            Self::Remote(source.to_owned())
        } else {
            Self::Directory(base.join(source))
        }
    }
}

/// Resolved site configuration.
#[derive(Debug)]
pub struct SiteConfig {
    /// Content location.
    pub source: ContentLocation,
    /// Root manifest path, relative to the base path.
    pub manifest: String,
    /// Hosting base path (`/` or `/<repo>/`); detected from the URL when unset.
    pub base_path: Option<String>,
    /// Section opened when nothing else applies.
    pub home_section: String,
    /// Append `?v=<millis>` to remote fetches.
    pub cache_bust: bool,
    /// Site name used in document titles.
    pub name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source: ContentLocation::Directory(PathBuf::from(".")),
            manifest: DEFAULT_MANIFEST.to_owned(),
            base_path: None,
            home_section: "homepage".to_owned(),
            cache_bust: true,
            name: "SwyftNav".to_owned(),
        }
    }
}

/// Search configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Results shown before "show all".
    pub preview_limit: usize,
    /// Snippet context (characters each side) for body text.
    pub body_context: usize,
    /// Snippet context for code.
    pub code_context: usize,
    /// Snippet context for list items.
    pub list_context: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            preview_limit: 15,
            body_context: 50,
            code_context: 30,
            list_context: 50,
        }
    }
}

/// Raw state configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StateConfigRaw {
    dir: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.source`").
        field: String,
        /// Error message (e.g., "${`DOCS_ORIGIN`} not set").
        message: String,
    },
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a count field to be positive.
fn require_positive(value: usize, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `swyft.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the result is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source) = &settings.source {
            let cwd = std::env::current_dir().unwrap_or_default();
            self.site_resolved.source = ContentLocation::parse(source, &cwd);
        }
        if let Some(base_path) = &settings.base_path {
            self.site_resolved.base_path = Some(base_path.clone());
        }
        if let Some(state_dir) = &settings.state_dir {
            self.state_dir.clone_from(state_dir);
        }
        if let Some(cache_bust) = settings.cache_bust {
            self.site_resolved.cache_bust = cache_bust;
        }
    }

    /// Path of the persisted preferences file.
    #[must_use]
    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join("state.json")
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfigRaw::default(),
            search: SearchConfig::default(),
            state: StateConfigRaw::default(),
            site_resolved: SiteConfig {
                source: ContentLocation::Directory(base.to_path_buf()),
                ..SiteConfig::default()
            },
            state_dir: base.join(".swyft"),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_search()?;
        Ok(())
    }

    /// Validate site configuration.
    fn validate_site(&self) -> Result<(), ConfigError> {
        let site = &self.site_resolved;
        require_non_empty(&site.manifest, "site.manifest")?;
        require_non_empty(&site.home_section, "site.home_section")?;

        if let ContentLocation::Remote(origin) = &site.source
            && origin.trim_start_matches("https://").trim_start_matches("http://").is_empty()
        {
            return Err(ConfigError::Validation(
                "site.source URL has no host".to_owned(),
            ));
        }

        if let Some(base_path) = &site.base_path
            && !(base_path.starts_with('/') && base_path.ends_with('/'))
        {
            return Err(ConfigError::Validation(format!(
                "site.base_path must start and end with '/', got {base_path:?}"
            )));
        }

        Ok(())
    }

    /// Validate search configuration.
    fn validate_search(&self) -> Result<(), ConfigError> {
        require_positive(self.search.preview_limit, "search.preview_limit")?;
        require_positive(self.search.body_context, "search.body_context")?;
        require_positive(self.search.code_context, "search.code_context")?;
        require_positive(self.search.list_context, "search.list_context")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref source) = self.site.source {
            self.site.source = Some(expand::expand_env(source, "site.source")?);
        }
        if let Some(ref base_path) = self.site.base_path {
            self.site.base_path = Some(expand::expand_env(base_path, "site.base_path")?);
        }
        if let Some(ref dir) = self.state.dir {
            self.state.dir = Some(expand::expand_env(dir, "state.dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = SiteConfig::default();
        let source = match self.site.source.as_deref() {
            Some(source) => ContentLocation::parse(source, config_dir),
            None => ContentLocation::Directory(config_dir.to_path_buf()),
        };

        self.site_resolved = SiteConfig {
            source,
            manifest: self
                .site
                .manifest
                .clone()
                .unwrap_or(defaults.manifest)
                .trim_start_matches('/')
                .to_owned(),
            base_path: self.site.base_path.clone(),
            home_section: self.site.home_section.clone().unwrap_or(defaults.home_section),
            cache_bust: self.site.cache_bust.unwrap_or(defaults.cache_bust),
            name: self.site.name.clone().unwrap_or(defaults.name),
        };

        self.state_dir = config_dir.join(self.state.dir.as_deref().unwrap_or(".swyft"));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));

        assert_eq!(
            config.site_resolved.source,
            ContentLocation::Directory(PathBuf::from("/test"))
        );
        assert_eq!(config.site_resolved.manifest, "data/config/config.json");
        assert_eq!(config.site_resolved.home_section, "homepage");
        assert!(config.site_resolved.cache_bust);
        assert_eq!(config.site_resolved.base_path, None);
        assert_eq!(config.search.preview_limit, 15);
        assert_eq!(config.search.code_context, 30);
        assert_eq!(config.state_dir, PathBuf::from("/test/.swyft"));
        assert_eq!(config.state_file(), PathBuf::from("/test/.swyft/state.json"));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.search.preview_limit, 15);
        assert_eq!(config.search.body_context, 50);
    }

    #[test]
    fn test_parse_search_config() {
        let toml = r"
[search]
preview_limit = 5
code_context = 10
";
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.search.preview_limit, 5);
        assert_eq!(config.search.code_context, 10);
        assert_eq!(config.search.list_context, 50);
    }

    #[test]
    fn test_resolve_paths_local_source() {
        let toml = r#"
[site]
source = "public"
manifest = "/data/nav.json"
home_section = "start"
name = "Guides"

[state]
dir = "var/state"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.site_resolved.source,
            ContentLocation::Directory(PathBuf::from("/project/public"))
        );
        assert_eq!(config.site_resolved.manifest, "data/nav.json");
        assert_eq!(config.site_resolved.home_section, "start");
        assert_eq!(config.site_resolved.name, "Guides");
        assert_eq!(config.state_dir, PathBuf::from("/project/var/state"));
    }

    #[test]
    fn test_resolve_paths_remote_source() {
        let toml = r#"
[site]
source = "https://example.github.io"
base_path = "/docs/"
cache_bust = false
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.site_resolved.source,
            ContentLocation::Remote("https://example.github.io".to_owned())
        );
        assert_eq!(config.site_resolved.base_path.as_deref(), Some("/docs/"));
        assert!(!config.site_resolved.cache_bust);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("swyft.toml");
        std::fs::write(&path, "[site]\nsource = \"site\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(
            config.site_resolved.source,
            ContentLocation::Directory(tmp.path().join("site"))
        );
        assert_eq!(config.state_dir, tmp.path().join(".swyft"));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let tmp = TempDir::new().unwrap();

        let err = Config::load(Some(&tmp.path().join("missing.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("swyft.toml");
        std::fs::write(&path, "[site\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_apply_cli_settings_source_url() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            source: Some("https://docs.example.com".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.site_resolved.source,
            ContentLocation::Remote("https://docs.example.com".to_owned())
        );
        assert!(config.site_resolved.cache_bust); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_multiple() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            base_path: Some("/repo/".to_owned()),
            state_dir: Some(PathBuf::from("/tmp/state")),
            cache_bust: Some(false),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.site_resolved.base_path.as_deref(), Some("/repo/"));
        assert_eq!(config.state_dir, PathBuf::from("/tmp/state"));
        assert!(!config.site_resolved.cache_bust);
        assert_eq!(
            config.site_resolved.source,
            ContentLocation::Directory(PathBuf::from("/test"))
        );
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.state_dir, PathBuf::from("/test/.swyft"));
        assert!(config.site_resolved.cache_bust);
    }

    #[test]
    fn test_expand_env_vars_site_source() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SWYFT_TEST_ORIGIN", "https://mirror.example.com");
        }

        let toml = r#"
[site]
source = "${SWYFT_TEST_ORIGIN}"
base_path = "${SWYFT_TEST_BASE:-/}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.site_resolved.source,
            ContentLocation::Remote("https://mirror.example.com".to_owned())
        );
        assert_eq!(config.site_resolved.base_path.as_deref(), Some("/"));

        unsafe {
            std::env::remove_var("SWYFT_TEST_ORIGIN");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_SWYFT_CONFIG_TEST");
        }

        let toml = r#"
[state]
dir = "${MISSING_VAR_SWYFT_CONFIG_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_SWYFT_CONFIG_TEST"));
        assert!(err.to_string().contains("state.dir"));
    }

    #[test]
    fn test_validate_default_config_passes() {
        Config::default_with_base(Path::new("/test")).validate().unwrap();
    }

    #[test]
    fn test_validate_base_path_needs_slashes() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.site_resolved.base_path = Some("docs".to_owned());

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("site.base_path"));
    }

    #[test]
    fn test_validate_remote_source_needs_host() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.site_resolved.source = ContentLocation::Remote("https://".to_owned());

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("site.source"));
    }

    #[test]
    fn test_validate_preview_limit_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.search.preview_limit = 0;

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("search.preview_limit"));
    }

    #[test]
    fn test_validate_home_section_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.site_resolved.home_section = String::new();

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("site.home_section"));
    }
}
