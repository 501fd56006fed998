//! PyPI JSON API client.
//!
//! Serves the two documents the resolver consumes:
//! `GET /pypi/{name}/json` and `GET /pypi/{name}/{version}/json`.

use crate::client::{HttpClient, HttpClientConfig};
use crate::documents::{ProjectDocument, ReleaseDocument};
use crate::error::{IndexError, Result};
use crate::source::PackageIndex;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use url::Url;

/// Default public index URL.
pub const PYPI_URL: &str = "https://pypi.org/";

/// PyPI client configuration.
#[derive(Debug, Clone)]
pub struct PyPiConfig {
    /// Index base URL.
    pub base_url: Url,
    /// HTTP client configuration.
    pub http_config: HttpClientConfig,
}

impl Default for PyPiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(PYPI_URL).expect("valid URL"),
            http_config: HttpClientConfig::default(),
        }
    }
}

/// PyPI client statistics.
#[derive(Debug, Default)]
pub struct PyPiStats {
    /// Project documents fetched.
    pub projects_fetched: AtomicU64,
    /// Release documents fetched.
    pub releases_fetched: AtomicU64,
    /// Total release keys observed across project documents.
    pub release_keys_seen: AtomicU64,
}

impl PyPiStats {
    /// Get a one-line summary for logging.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "PyPI: {} projects, {} releases fetched, {} release keys seen",
            self.projects_fetched.load(Ordering::Relaxed),
            self.releases_fetched.load(Ordering::Relaxed),
            self.release_keys_seen.load(Ordering::Relaxed),
        )
    }
}

/// Client for the PyPI JSON API.
pub struct PyPiClient {
    /// Configuration.
    config: PyPiConfig,
    /// HTTP client.
    http: Arc<HttpClient>,
    /// Statistics.
    stats: Arc<PyPiStats>,
}

impl std::fmt::Debug for PyPiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PyPiClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl PyPiClient {
    /// Create a client for the public index.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self> {
        Self::with_config(PyPiConfig::default())
    }

    /// Create a client with custom configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_config(config: PyPiConfig) -> Result<Self> {
        let http = HttpClient::with_config(config.http_config.clone())?;
        Ok(Self {
            config,
            http: Arc::new(http),
            stats: Arc::new(PyPiStats::default()),
        })
    }

    /// Create a client pointed at a different index (mirrors, test servers).
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_base_url(base_url: Url) -> Result<Self> {
        Self::with_config(PyPiConfig {
            base_url,
            ..Default::default()
        })
    }

    /// The index base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Get client statistics.
    #[must_use]
    pub fn stats(&self) -> &PyPiStats {
        &self.stats
    }

    /// Get the underlying HTTP client.
    #[must_use]
    pub fn http_client(&self) -> &HttpClient {
        &self.http
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.config
            .base_url
            .join(path)
            .map_err(|e| IndexError::InvalidUrl {
                url: format!("{}{path}", self.config.base_url),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl PackageIndex for PyPiClient {
    async fn latest_info(&self, name: &str) -> Result<ProjectDocument> {
        let url = self.endpoint(&format!("pypi/{name}/json"))?;
        let response = self.http.get(&url).await?;

        if response.status.as_u16() == 404 {
            return Err(IndexError::NotFound {
                name: name.to_string(),
                version: None,
            });
        }
        if !response.status.is_success() {
            return Err(IndexError::Network {
                url: url.to_string(),
                message: format!("unexpected status: {}", response.status),
                status: Some(response.status.as_u16()),
            });
        }

        let document: ProjectDocument =
            sonic_rs::from_slice(&response.body).map_err(|e| IndexError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        self.stats.projects_fetched.fetch_add(1, Ordering::Relaxed);
        self.stats
            .release_keys_seen
            .fetch_add(document.releases.len() as u64, Ordering::Relaxed);

        debug!(
            package = %name,
            releases = document.releases.len(),
            "fetched project document"
        );

        Ok(document)
    }

    async fn release_info(&self, name: &str, version: &str) -> Result<ReleaseDocument> {
        let url = self.endpoint(&format!("pypi/{name}/{version}/json"))?;
        let response = self.http.get(&url).await?;

        if response.status.as_u16() == 404 {
            return Err(IndexError::NotFound {
                name: name.to_string(),
                version: Some(version.to_string()),
            });
        }
        if !response.status.is_success() {
            return Err(IndexError::Network {
                url: url.to_string(),
                message: format!("unexpected status: {}", response.status),
                status: Some(response.status.as_u16()),
            });
        }

        let document: ReleaseDocument =
            sonic_rs::from_slice(&response.body).map_err(|e| IndexError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        self.stats.releases_fetched.fetch_add(1, Ordering::Relaxed);

        debug!(
            package = %name,
            version = %version,
            fragments = document.info.requires_dist.as_ref().map_or(0, Vec::len),
            "fetched release document"
        );

        Ok(document)
    }
}
