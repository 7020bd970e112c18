//! HTTP client for portal fetches with bounded retries
//!
//! Every GET is retried the same way regardless of what went wrong: a
//! connection error, an unreadable body and a 404 all count as one failed
//! attempt followed by a fixed backoff.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::infrastructure::config::{HttpConfig, defaults};
use crate::infrastructure::errors::{ScrapeError, ScrapeResult};

/// Body of a successful GET together with the URL it was requested from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }
}

/// Source of portal pages.
///
/// `fetch` either returns a page or fails with `FetchExhausted` once its
/// retries are spent.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ScrapeResult<RawResponse>;
}

/// Fixed-backoff retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self { attempts, backoff }
    }

    /// `sleep_seconds * 5` between attempts
    pub fn from_http_config(config: &HttpConfig) -> Self {
        Self::new(
            config.retries_count,
            Duration::from_secs(config.sleep_seconds.saturating_mul(defaults::BACKOFF_FACTOR)),
        )
    }

    /// Run `op` up to `attempts` times, sleeping `backoff` after every failure
    /// except the last one.
    pub async fn run<T, E, F, Fut>(&self, url: &str, mut op: F) -> ScrapeResult<T>
    where
        E: std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempts = self.attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("Fetched {} on attempt {}", url, attempt);
                    }
                    return Ok(value);
                }
                Err(e) => {
                    warn!("Attempt {}/{} failed for {}: {}", attempt, attempts, url, e);
                    last_error = e.to_string();
                    if attempt < attempts {
                        sleep(self.backoff).await;
                    }
                }
            }
        }

        error!("Portal did not respond: all {} attempts failed for {}", attempts, url);
        Err(ScrapeError::fetch_exhausted(url, attempts, last_error))
    }
}

/// reqwest-backed fetcher
pub struct HttpClient {
    client: Client,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> anyhow::Result<Self> {
        Self::with_retry_policy(config, RetryPolicy::from_http_config(config))
    }

    pub fn with_retry_policy(config: &HttpConfig, retry: RetryPolicy) -> anyhow::Result<Self> {
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let client = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;

        Ok(Self { client, retry })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// One GET; any transport error or non-success status is a failed attempt.
    async fn get_once(&self, url: &str) -> anyhow::Result<RawResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP request failed with status {}", status);
        }
        let body = response.text().await?;
        debug!("Fetched {} ({} chars)", url, body.len());
        Ok(RawResponse::new(url, status.as_u16(), body))
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> ScrapeResult<RawResponse> {
        self.retry.run(url, move || self.get_once(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[test]
    fn test_backoff_is_five_times_sleep_seconds() {
        let config = HttpConfig {
            retries_count: 4,
            sleep_seconds: 2,
            ..HttpConfig::default()
        };
        let policy = RetryPolicy::from_http_config(&config);
        assert_eq!(policy.attempts, 4);
        assert_eq!(policy.backoff, Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_last_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_secs(5));
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let started = Instant::now();

        let result = policy
            .run("https://portal.test/a", move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 { Err("connection reset") } else { Ok("page") }
            })
            .await;

        assert_eq!(result.unwrap(), "page");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_after_all_attempts() {
        let policy = RetryPolicy::new(4, Duration::from_secs(5));
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let started = Instant::now();

        let result: ScrapeResult<()> = policy
            .run("https://portal.test/b", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("dns failure")
            })
            .await;

        match result {
            Err(ScrapeError::FetchExhausted {
                url,
                attempts,
                last_error,
            }) => {
                assert_eq!(url, "https://portal.test/b");
                assert_eq!(attempts, 4);
                assert_eq!(last_error, "dns failure");
            }
            other => panic!("expected FetchExhausted, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new(&HttpConfig::default());
        assert!(client.is_ok());
        assert_eq!(
            client.unwrap().retry_policy().backoff,
            Duration::from_secs(5)
        );
    }
}
