//! CLI error types.

use swyft_config::ConfigError;
use swyft_prefs::StoreError;
use swyft_site::SiteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Site(#[from] SiteError),

    #[error("Failed to save preferences: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Validation(String),
}
