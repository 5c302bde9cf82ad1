//! Content source trait and error types.
//!
//! Provides the core [`ContentSource`] trait for fetching documents, along with
//! [`SourceError`] for unified error handling across backends.
//!
//! # Path Convention
//!
//! All path parameters are **resolved URL paths** as a static web host would
//! see them, already joined with the hosting base path:
//! - `"/data/config/config.json"` - root manifest
//! - `"/docs/data/java/intro.json"` - content file under a `/docs/` base path
//!
//! A trailing query string (e.g. a `?v=` cache-busting parameter) is allowed
//! and ignored by backends that cannot use it.

use async_trait::async_trait;

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum SourceErrorKind {
    /// Document does not exist (HTTP 404, missing file).
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path (escapes the source root, malformed URL).
    InvalidPath,
    /// Backend is temporarily unavailable (HTTP 5xx, connection refused).
    Unavailable,
    /// Too many requests.
    RateLimited,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Retry guidance.
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy)]
pub enum ErrorStatus {
    /// Don't retry (not found, invalid path).
    #[default]
    Permanent,
    /// Retry immediately (timeout, connection reset).
    Temporary,
    /// Retry with backoff (rate limited, service unavailable).
    Persistent,
}

/// Source error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct SourceError {
    /// Semantic error category.
    pub kind: SourceErrorKind,
    /// Retry guidance.
    pub status: ErrorStatus,
    /// Path context (if applicable).
    pub path: Option<String>,
    /// Backend identifier (e.g., "Fs", "Http", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SourceError {
    /// Create a new source error.
    #[must_use]
    pub fn new(kind: SourceErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::Permanent,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set retry status.
    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound).with_path(path)
    }

    /// Create a source error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<String>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => SourceErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => SourceErrorKind::PermissionDenied,
            std::io::ErrorKind::TimedOut => SourceErrorKind::Timeout,
            _ => SourceErrorKind::Other,
        };
        let status = match err.kind() {
            std::io::ErrorKind::TimedOut => ErrorStatus::Temporary,
            _ => ErrorStatus::Permanent,
        };
        let mut error = Self::new(kind).with_status(status).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }

    /// Create a source error from a non-2xx HTTP status code.
    #[must_use]
    pub fn http_status(code: u16, path: impl Into<String>) -> Self {
        let (kind, status) = match code {
            404 | 410 => (SourceErrorKind::NotFound, ErrorStatus::Permanent),
            401 | 403 => (SourceErrorKind::PermissionDenied, ErrorStatus::Permanent),
            408 => (SourceErrorKind::Timeout, ErrorStatus::Temporary),
            429 => (SourceErrorKind::RateLimited, ErrorStatus::Persistent),
            500..=599 => (SourceErrorKind::Unavailable, ErrorStatus::Persistent),
            _ => (SourceErrorKind::Other, ErrorStatus::Permanent),
        };
        Self::new(kind)
            .with_status(status)
            .with_path(path)
            .with_source(HttpStatus(code))
    }
}

/// Non-2xx status carried as the error source.
#[derive(Debug)]
struct HttpStatus(u16);

impl std::fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}", self.0)
    }
}

impl std::error::Error for HttpStatus {}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            SourceErrorKind::NotFound => "Not found",
            SourceErrorKind::PermissionDenied => "Permission denied",
            SourceErrorKind::InvalidPath => "Invalid path",
            SourceErrorKind::Unavailable => "Unavailable",
            SourceErrorKind::RateLimited => "Rate limited",
            SourceErrorKind::Timeout => "Timeout",
            SourceErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {path})")?;
        }

        Ok(())
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Strip a trailing query string or fragment from a URL path.
///
/// ```
/// use swyft_storage::strip_query;
///
/// assert_eq!(strip_query("/data/a.json?v=123"), "/data/a.json");
/// assert_eq!(strip_query("/data/a.json"), "/data/a.json");
/// ```
#[must_use]
pub fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

/// Document source abstraction.
///
/// Provides a unified interface for fetching manifest and content documents
/// regardless of where the portal is hosted. Implementations must be safe to
/// call concurrently; callers fan out many fetches at once when loading a
/// section.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the full text of a document.
    ///
    /// # Arguments
    ///
    /// * `path` - Resolved URL path (e.g., "/data/config/config.json")
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the document doesn't exist, the backend
    /// answered with a non-2xx status, or the transport failed.
    async fn fetch(&self, path: &str) -> Result<String, SourceError>;

    /// Backend identifier used in log lines and error messages.
    fn backend(&self) -> &'static str;
}
