//! HTTP content source.
//!
//! Provides [`HttpSource`] for fetching documents from a static web host.
//! Requests run on tokio's blocking pool because the HTTP client is sync.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use ureq::Agent;

use crate::source::{ContentSource, ErrorStatus, SourceError, SourceErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Http";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Static web host content source.
///
/// Joins resolved URL paths onto `origin` (scheme + host, e.g.
/// `https://example.github.io`). With cache busting enabled every request
/// carries a `?v=<millis>` parameter so intermediate caches never serve a
/// stale manifest.
pub struct HttpSource {
    agent: Agent,
    origin: String,
    cache_bust: bool,
}

impl HttpSource {
    /// Create a source for `origin` with cache busting enabled.
    #[must_use]
    pub fn new(origin: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            origin: origin.trim_end_matches('/').to_owned(),
            cache_bust: true,
        }
    }

    /// Enable or disable the `?v=` cache-busting parameter.
    #[must_use]
    pub fn with_cache_bust(mut self, enabled: bool) -> Self {
        self.cache_bust = enabled;
        self
    }

    /// Build the request URL for a resolved path.
    fn url_for(&self, path: &str) -> String {
        let slash = if path.starts_with('/') { "" } else { "/" };
        let mut url = format!("{}{slash}{path}", self.origin);
        if self.cache_bust {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_millis());
            let sep = if url.contains('?') { '&' } else { '?' };
            url.push_str(&format!("{sep}v={millis}"));
        }
        url
    }
}

/// Map a transport error onto the semantic source error.
fn transport_error(err: ureq::Error, path: &str) -> SourceError {
    let (kind, status) = match &err {
        ureq::Error::Timeout(_) => (SourceErrorKind::Timeout, ErrorStatus::Temporary),
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
            (SourceErrorKind::Unavailable, ErrorStatus::Temporary)
        }
        _ => (SourceErrorKind::Other, ErrorStatus::Permanent),
    };
    SourceError::new(kind)
        .with_status(status)
        .with_path(path)
        .with_backend(BACKEND)
        .with_source(err)
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<String, SourceError> {
        let url = self.url_for(path);
        let agent = self.agent.clone();
        let owned_path = path.to_owned();

        tracing::debug!(%url, "fetching document");

        tokio::task::spawn_blocking(move || {
            let response = agent
                .get(&url)
                .header("Accept", "application/json")
                .call()
                .map_err(|e| transport_error(e, &owned_path))?;

            let status = response.status().as_u16();
            if !(200..300).contains(&status) {
                return Err(SourceError::http_status(status, owned_path).with_backend(BACKEND));
            }

            response
                .into_body()
                .read_to_string()
                .map_err(|e| transport_error(e, &owned_path))
        })
        .await
        .map_err(|e| {
            SourceError::new(SourceErrorKind::Other)
                .with_path(path)
                .with_backend(BACKEND)
                .with_source(e)
        })?
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}
