//! HTTP client with connection pooling and retry logic.

use crate::error::{IndexError, Result};
use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode, header};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Maximum retries for transient failures.
    pub max_retries: usize,
    /// Initial retry delay.
    pub retry_delay: Duration,
    /// Maximum retry delay.
    pub max_retry_delay: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_delay: Duration::from_millis(100),
            max_retry_delay: Duration::from_secs(10),
            user_agent: format!("Wheelwright/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client statistics.
#[derive(Debug, Default)]
pub struct HttpClientStats {
    /// Total requests made.
    pub requests: AtomicU64,
    /// Successful requests (2xx).
    pub successes: AtomicU64,
    /// Client errors (4xx).
    pub client_errors: AtomicU64,
    /// Server errors (5xx).
    pub server_errors: AtomicU64,
    /// Retries attempted.
    pub retries: AtomicU64,
    /// Total bytes received.
    pub bytes_received: AtomicU64,
    /// Total time spent on requests.
    total_request_time_ms: AtomicU64,
}

impl HttpClientStats {
    /// Create new stats tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get average request time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_request_time_ms(&self) -> f64 {
        let total = self.total_request_time_ms.load(Ordering::Relaxed);
        let count = self.requests.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    fn record_request(&self, duration: Duration) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.total_request_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }
}

/// HTTP response with the metadata callers inspect.
#[derive(Debug)]
pub struct HttpResponse {
    /// Response body bytes.
    pub body: bytes::Bytes,
    /// HTTP status code.
    pub status: StatusCode,
}

/// HTTP client with retry logic for transient failures.
///
/// Non-success statuses below 500 are returned as responses, not errors,
/// so callers can map them to domain errors (e.g. 404 to not-found).
#[derive(Debug)]
pub struct HttpClient {
    /// Underlying reqwest client.
    client: Client,
    /// Configuration.
    config: HttpClientConfig,
    /// Statistics.
    stats: Arc<HttpClientStats>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration.
    ///
    /// # Errors
    /// Returns error if the client cannot be created.
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration.
    ///
    /// # Errors
    /// Returns error if the client cannot be created.
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            config
                .user_agent
                .parse()
                .map_err(|_| IndexError::InvalidConfig {
                    message: "Invalid user agent".into(),
                })?,
        );
        headers.insert(
            header::ACCEPT,
            "application/json"
                .parse()
                .map_err(|_| IndexError::InvalidConfig {
                    message: "Invalid accept header".into(),
                })?,
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .gzip(true)
            .default_headers(headers)
            .build()
            .map_err(|e| IndexError::InvalidConfig {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            config,
            stats: Arc::new(HttpClientStats::new()),
        })
    }

    /// Get client statistics.
    #[must_use]
    pub fn stats(&self) -> &HttpClientStats {
        &self.stats
    }

    /// Issue a GET request, retrying transient failures with exponential
    /// backoff.
    ///
    /// # Errors
    /// Returns error when the transport fails or the server keeps answering
    /// with 5xx beyond the retry budget.
    pub async fn get(&self, url: &Url) -> Result<HttpResponse> {
        let start = Instant::now();

        let fetch = || async { self.get_once(url).await };
        let result = fetch
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(self.config.retry_delay)
                    .with_max_delay(self.config.max_retry_delay)
                    .with_max_times(self.config.max_retries),
            )
            .when(IndexError::is_transient)
            .notify(|err: &IndexError, delay: Duration| {
                self.stats.retries.fetch_add(1, Ordering::Relaxed);
                warn!(error = %err, delay_ms = delay.as_millis() as u64, "retrying request");
            })
            .await;

        self.stats.record_request(start.elapsed());

        let response = result?;
        if response.status.is_success() {
            self.stats.successes.fetch_add(1, Ordering::Relaxed);
        } else if response.status.is_client_error() {
            self.stats.client_errors.fetch_add(1, Ordering::Relaxed);
        }
        self.stats
            .bytes_received
            .fetch_add(response.body.len() as u64, Ordering::Relaxed);

        debug!(
            url = %url,
            status = response.status.as_u16(),
            bytes = response.body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request complete"
        );

        Ok(response)
    }

    async fn get_once(&self, url: &Url) -> Result<HttpResponse> {
        let response =
            self.client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| IndexError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                    status: None,
                })?;

        let status = response.status();
        if status.is_server_error() {
            self.stats.server_errors.fetch_add(1, Ordering::Relaxed);
            return Err(IndexError::Network {
                url: url.to_string(),
                message: format!("server error: {status}"),
                status: Some(status.as_u16()),
            });
        }

        let body = response.bytes().await.map_err(|e| IndexError::Network {
            url: url.to_string(),
            message: e.to_string(),
            status: None,
        })?;

        Ok(HttpResponse { body, status })
    }
}
