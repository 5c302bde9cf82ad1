//! Mock content source for testing.
//!
//! Provides [`MockSource`] for unit testing without filesystem or network
//! access. Besides canned documents it can simulate failures, count fetches,
//! and hold individual fetches open until a test releases them.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::source::{ContentSource, ErrorStatus, SourceError, SourceErrorKind, strip_query};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Normalize a path to the key used for lookups (no query, no leading slash).
fn key(path: &str) -> String {
    strip_query(path).trim_start_matches('/').to_owned()
}

/// Handle that releases fetches held by [`MockSource::gate`].
///
/// Dropping the handle without calling [`Gate::open`] leaves the fetches
/// pending forever.
#[derive(Debug, Clone)]
pub struct Gate {
    semaphore: Arc<Semaphore>,
}

impl Gate {
    /// Release every fetch waiting on this gate, now and later.
    pub fn open(&self) {
        self.semaphore.close();
    }
}

/// Mock source for testing.
///
/// Stores documents in memory. Use the builder methods to configure the mock
/// with test data.
///
/// # Example
///
/// ```ignore
/// use swyft_storage::{ContentSource, MockSource};
///
/// let source = MockSource::new()
///     .with_document("data/config/config.json", r#"{"sections":{}}"#)
///     .with_failure("data/broken.json");
///
/// let text = source.fetch("/data/config/config.json").await?;
/// assert_eq!(source.fetch_count("data/config/config.json"), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockSource {
    documents: RwLock<HashMap<String, String>>,
    failures: RwLock<HashSet<String>>,
    gates: RwLock<HashMap<String, Arc<Semaphore>>>,
    counts: RwLock<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl MockSource {
    /// Create a new empty mock source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document at the given path.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_document(self, path: &str, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    /// Make fetches of `path` fail with an unavailable error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, path: &str) -> Self {
        self.failures.write().unwrap().insert(key(path));
        self
    }

    /// Stop failing fetches of `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn recover(&self, path: &str) {
        self.failures.write().unwrap().remove(&key(path));
    }

    /// Add or replace a document after construction.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn insert(&self, path: &str, content: impl Into<String>) {
        self.documents
            .write()
            .unwrap()
            .insert(key(path), content.into());
    }

    /// Hold every fetch of `path` until the returned [`Gate`] is opened.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn gate(&self, path: &str) -> Gate {
        let semaphore = Arc::new(Semaphore::new(0));
        self.gates
            .write()
            .unwrap()
            .insert(key(path), Arc::clone(&semaphore));
        Gate { semaphore }
    }

    /// Number of fetches issued for `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn fetch_count(&self, path: &str) -> usize {
        self.counts
            .read()
            .unwrap()
            .get(&key(path))
            .copied()
            .unwrap_or(0)
    }

    /// Number of fetches issued for any path.
    #[must_use]
    pub fn total_fetches(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for MockSource {
    async fn fetch(&self, path: &str) -> Result<String, SourceError> {
        let k = key(path);
        *self.counts.write().unwrap().entry(k.clone()).or_insert(0) += 1;
        self.total.fetch_add(1, Ordering::SeqCst);

        let gate = self.gates.read().unwrap().get(&k).cloned();
        if let Some(semaphore) = gate {
            // A closed semaphore means the gate was opened.
            let _ = semaphore.acquire().await;
        }

        if self.failures.read().unwrap().contains(&k) {
            return Err(SourceError::new(SourceErrorKind::Unavailable)
                .with_status(ErrorStatus::Persistent)
                .with_path(path)
                .with_backend(BACKEND));
        }

        self.documents
            .read()
            .unwrap()
            .get(&k)
            .cloned()
            .ok_or_else(|| SourceError::not_found(path).with_backend(BACKEND))
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}
