//! Error type shared by the loading, search and navigation layers.

use swyft_storage::{SourceError, SourceErrorKind};

/// Error returned when content cannot be loaded or resolved.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Fetching a manifest or content file failed.
    #[error("Failed to fetch {path}: {source}")]
    Network {
        /// Resolved path that was requested.
        path: String,
        /// Underlying source error.
        #[source]
        source: SourceError,
    },
    /// Id could not be resolved after every lookup strategy.
    #[error("Content not found: {0}")]
    NotFound(String),
    /// Document was fetched but is not valid JSON of the expected shape.
    #[error("Malformed JSON in {path}: {source}")]
    Parse {
        /// Resolved path of the document.
        path: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// Manifest is structurally unusable.
    #[error("Invalid manifest: {0}")]
    Manifest(String),
}

impl SiteError {
    /// Whether the error means "does not exist" rather than a failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Network { source, .. } => source.kind == SourceErrorKind::NotFound,
            _ => false,
        }
    }
}
