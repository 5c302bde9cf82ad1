//! Filesystem content source.
//!
//! Provides [`FsSource`] for serving documents from a local directory that
//! mirrors the layout of the static web host (the directory plays the role of
//! the host root).

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::source::{ContentSource, SourceError, SourceErrorKind, strip_query};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem content source.
///
/// Maps resolved URL paths onto files below `root_dir`:
/// `"/data/config/config.json"` → `{root_dir}/data/config/config.json`.
/// Paths that would escape the root (`..`) are rejected.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use swyft_storage::{ContentSource, FsSource};
///
/// let source = FsSource::new(PathBuf::from("public"));
/// let text = source.fetch("/data/config/config.json").await?;
/// ```
pub struct FsSource {
    root_dir: PathBuf,
}

impl FsSource {
    /// Create a new filesystem source rooted at `root_dir`.
    #[must_use]
    pub fn new(root_dir: PathBuf) -> Self {
        Self { root_dir }
    }

    /// Root directory this source serves from.
    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Map a URL path to a file below the root.
    fn file_path(&self, url_path: &str) -> Result<PathBuf, SourceError> {
        let relative = Path::new(strip_query(url_path).trim_start_matches('/'));

        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(SourceError::new(SourceErrorKind::InvalidPath)
                .with_path(url_path)
                .with_backend(BACKEND));
        }

        Ok(self.root_dir.join(relative))
    }
}

#[async_trait]
impl ContentSource for FsSource {
    async fn fetch(&self, path: &str) -> Result<String, SourceError> {
        let file = self.file_path(path)?;
        tracing::debug!(path, file = %file.display(), "reading document");
        tokio::fs::read_to_string(&file)
            .await
            .map_err(|e| SourceError::io(e, Some(path.to_owned())).with_backend(BACKEND))
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn create_source() -> (TempDir, FsSource) {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("data/config")).unwrap();
        std::fs::write(
            tmp.path().join("data/config/config.json"),
            r#"{"sections":{}}"#,
        )
        .unwrap();
        let source = FsSource::new(tmp.path().to_path_buf());
        (tmp, source)
    }

    #[tokio::test]
    async fn test_fetch_reads_file() {
        let (_tmp, source) = create_source();

        let text = source.fetch("/data/config/config.json").await.unwrap();

        assert_eq!(text, r#"{"sections":{}}"#);
    }

    #[tokio::test]
    async fn test_fetch_ignores_cache_busting_query() {
        let (_tmp, source) = create_source();

        let text = source
            .fetch("/data/config/config.json?v=1700000000")
            .await
            .unwrap();

        assert_eq!(text, r#"{"sections":{}}"#);
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_not_found() {
        let (_tmp, source) = create_source();

        let err = source.fetch("/data/missing.json").await.unwrap_err();

        assert_eq!(err.kind, SourceErrorKind::NotFound);
        assert_eq!(err.backend, Some("Fs"));
        assert_eq!(err.path.as_deref(), Some("/data/missing.json"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_parent_traversal() {
        let (_tmp, source) = create_source();

        let err = source.fetch("/../etc/passwd").await.unwrap_err();

        assert_eq!(err.kind, SourceErrorKind::InvalidPath);
    }

    #[tokio::test]
    async fn test_fetch_rejects_empty_path() {
        let (_tmp, source) = create_source();

        let err = source.fetch("/").await.unwrap_err();

        assert_eq!(err.kind, SourceErrorKind::InvalidPath);
    }
}
