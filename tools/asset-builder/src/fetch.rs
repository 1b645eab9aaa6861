//! Read-only retrieval of preset assets
//!
//! Presets (fonts, emoji sets, wake-word models, charsets) live in a static
//! asset tree addressed by relative paths such as `fonts/<name>.bin` or
//! `wakenet_model/<model>/wn9_data`. The tree is either a local directory or
//! an HTTP server. Fetches are never retried here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::FetchError;

/// Timeout for one remote fetch
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Retrieves preset asset bytes by relative path.
pub trait RemoteFetch: Send + Sync {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}

/// Static asset tree on the local filesystem.
#[derive(Debug, Clone)]
pub struct StaticDirFetcher {
    root: PathBuf,
}

impl StaticDirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RemoteFetch for StaticDirFetcher {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        // Reject paths that escape the asset root
        if Path::new(path)
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(FetchError::NotFound(path.to_string()));
        }

        let full = self.root.join(path);
        debug!("Reading static asset {}", full.display());
        std::fs::read(&full).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(path.to_string())
            } else {
                FetchError::Io { path: full, source }
            }
        })
    }
}

/// Static asset tree served over HTTP.
///
/// Each fetch drives its own current-thread runtime, so the fetcher can be
/// called from worker threads without an ambient async context.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn fetch_async(&self, url: String) -> Result<Vec<u8>, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|source| FetchError::Http {
                url: url.clone(),
                source,
            })?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| FetchError::Http {
                url: url.clone(),
                source,
            })?;
        Ok(bytes.to_vec())
    }
}

impl RemoteFetch for HttpFetcher {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(path);
        debug!("Fetching {}", url);

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(FetchError::Runtime)?;

        rt.block_on(self.fetch_async(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_dir_reads_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("fonts")).unwrap();
        std::fs::write(dir.path().join("fonts/puhui.bin"), [7u8, 8]).unwrap();

        let fetcher = StaticDirFetcher::new(dir.path());
        assert_eq!(fetcher.fetch("fonts/puhui.bin").unwrap(), vec![7, 8]);
    }

    #[test]
    fn test_static_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StaticDirFetcher::new(dir.path());
        assert!(matches!(
            fetcher.fetch("fonts/missing.bin"),
            Err(FetchError::NotFound(path)) if path == "fonts/missing.bin"
        ));
    }

    #[test]
    fn test_static_dir_rejects_escape() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StaticDirFetcher::new(dir.path().join("static"));
        assert!(matches!(
            fetcher.fetch("../secret"),
            Err(FetchError::NotFound(_))
        ));
        assert!(matches!(
            fetcher.fetch("/etc/passwd"),
            Err(FetchError::NotFound(_))
        ));
    }

    #[test]
    fn test_http_url_joining() {
        let fetcher = HttpFetcher::new("https://example.com/static/");
        assert_eq!(
            fetcher.url_for("twemoji64/happy.png"),
            "https://example.com/static/twemoji64/happy.png"
        );
        assert_eq!(
            fetcher.url_for("/fonts/a.bin"),
            "https://example.com/static/fonts/a.bin"
        );
    }
}
