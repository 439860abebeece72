//! Page image downloads into scratch storage.
//!
//! One attempt per image. A failed image is logged and left out; the caller
//! decides whether what is left is enough.

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;
use reqwest::header::REFERER;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::models::{DownloadedImage, PageSource};

/// Sent with image requests when no user agent is configured.
pub const USER_AGENT: &str = concat!("mangapress/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An image that could not be retrieved.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub index: usize,
    pub source: String,
    pub reason: String,
}

/// Outcome of fetching one chapter's images.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Successful downloads, in source order.
    pub images: Vec<DownloadedImage>,
    pub failures: Vec<FetchFailure>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// HTTP image fetcher.
#[derive(Clone)]
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    /// Create a fetcher with a per-request timeout.
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent.unwrap_or(USER_AGENT))
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }

    /// Download every source into `scratch_dir`.
    ///
    /// `referer` is sent with remote requests; image hosts commonly refuse
    /// hotlinked requests without it. Only scratch write errors are fatal.
    pub async fn fetch_all(
        &self,
        sources: &[PageSource],
        referer: Option<&Url>,
        scratch_dir: &Path,
    ) -> Result<FetchReport, FetchError> {
        let mut report = FetchReport::default();

        for (index, source) in sources.iter().enumerate() {
            let bytes = match self.fetch_one(source, referer).await {
                Ok(bytes) => bytes,
                Err(reason) => {
                    warn!("Skipping page {} ({}): {}", index + 1, source, reason);
                    report.failures.push(FetchFailure {
                        index,
                        source: source.to_string(),
                        reason,
                    });
                    continue;
                }
            };

            let path = scratch_dir.join(format!("{:03}-{}", index, source.file_name()));
            tokio::fs::write(&path, &bytes)
                .await
                .map_err(|e| FetchError::Write {
                    path: path.clone(),
                    source: e,
                })?;
            debug!("Saved page {} to {} ({} bytes)", index + 1, path.display(), bytes.len());

            report.images.push(DownloadedImage {
                index,
                path,
                source: source.to_string(),
            });
        }

        Ok(report)
    }

    /// Retrieve one image. Errors are soft and returned as a reason string.
    async fn fetch_one(&self, source: &PageSource, referer: Option<&Url>) -> Result<Vec<u8>, String> {
        match source {
            PageSource::Inline { payload, .. } => base64::engine::general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|e| format!("invalid inline image data: {}", e)),
            PageSource::Remote(url) => {
                let mut request = self.client.get(url.clone());
                if let Some(referer) = referer {
                    request = request.header(REFERER, referer.as_str());
                }

                let response = request.send().await.map_err(|e| e.to_string())?;
                let status = response.status();
                if !status.is_success() {
                    return Err(format!("HTTP {}", status));
                }

                response
                    .bytes()
                    .await
                    .map(|b| b.to_vec())
                    .map_err(|e| format!("failed reading body: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fetcher() -> ImageFetcher {
        ImageFetcher::new(Duration::from_secs(5), None).unwrap()
    }

    #[tokio::test]
    async fn test_inline_sources_need_no_network() {
        let dir = tempdir().unwrap();
        let base = Url::parse("https://example.com/").unwrap();
        let sources = vec![
            PageSource::parse("data:image/png;base64,aGVsbG8=", &base).unwrap(),
            PageSource::parse("data:image/png;base64,!!!notbase64", &base).unwrap(),
            PageSource::parse("data:image/jpeg;base64,d29ybGQ=", &base).unwrap(),
        ];

        let report = fetcher().fetch_all(&sources, None, dir.path()).await.unwrap();

        assert_eq!(report.images.len(), 2);
        assert_eq!(report.images[0].index, 0);
        assert_eq!(report.images[1].index, 2);
        assert_eq!(std::fs::read(&report.images[0].path).unwrap(), b"hello");
        assert_eq!(std::fs::read(&report.images[1].path).unwrap(), b"world");

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_soft_failure() {
        let dir = tempdir().unwrap();
        // Port 9 (discard) on localhost is closed in test environments
        let sources = vec![PageSource::Remote(
            Url::parse("http://127.0.0.1:9/001.jpg").unwrap(),
        )];

        let report = fetcher().fetch_all(&sources, None, dir.path()).await.unwrap();

        assert!(report.images.is_empty());
        assert_eq!(report.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_scratch_write_error_is_fatal() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone");
        let base = Url::parse("https://example.com/").unwrap();
        let sources = vec![PageSource::parse("data:image/png;base64,aGVsbG8=", &base).unwrap()];

        let err = fetcher().fetch_all(&sources, None, &missing).await.unwrap_err();
        assert!(matches!(err, FetchError::Write { .. }));
    }
}
