//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent
//! - A fixed pause after every successful fetch to cap the request rate
//! - Bounded retries with a fixed backoff for transient failures
//! - Error classification into transient and permanent failures

use crate::config::{Config, CrawlerConfig, SiteConfig};
use crate::FetchError;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Builds an HTTP client with the site's client identity
///
/// No request timeout is set beyond the transport defaults; the retry
/// policy is the only resilience mechanism.
///
/// # Example
///
/// ```no_run
/// use urban_scraper::config::SiteConfig;
/// use urban_scraper::crawler::build_http_client;
///
/// let client = build_http_client(&SiteConfig::default()).unwrap();
/// ```
pub fn build_http_client(site: &SiteConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(site.user_agent.as_str())
        .gzip(true)
        .brotli(true)
        .build()
}

/// How many times to try a URL and how long to wait between tries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,

    /// Fixed pause before each retry
    pub backoff: Duration,
}

impl From<&CrawlerConfig> for RetryPolicy {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: config.retry_backoff(),
        }
    }
}

/// Rate-limited, retrying page fetcher
///
/// Cheap to share behind an `Arc`; every detail worker uses the same client.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
    request_delay: Duration,
}

impl Fetcher {
    pub fn new(client: Client, retry: RetryPolicy, request_delay: Duration) -> Self {
        Self {
            client,
            retry,
            request_delay,
        }
    }

    /// Builds a fetcher and its client from the configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.site)?;
        Ok(Self::new(
            client,
            RetryPolicy::from(&config.crawler),
            config.crawler.request_delay(),
        ))
    }

    /// Fetches a URL and returns its body
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Connection error, timeout, body read error | Retry after backoff |
    /// | HTTP 403 / 408 / 429 / 5xx | Retry after backoff |
    /// | Other non-success HTTP status | Immediate permanent failure |
    /// | Malformed URL | Immediate permanent failure |
    ///
    /// After `max_attempts` transient failures the last one is returned as
    /// [`FetchError::Permanent`]. Transient errors never escape this function.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.fetch_once(url, attempt).await {
                Ok(body) => {
                    tokio::time::sleep(self.request_delay).await;
                    return Ok(body);
                }
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    tracing::warn!("Trying {} again after backoff: {}", e.url(), e);
                    tokio::time::sleep(self.retry.backoff).await;
                    attempt += 1;
                }
                Err(FetchError::Transient { url, reason, .. }) => {
                    tracing::warn!("Ended after {} attempts on {}", attempt, url);
                    return Err(FetchError::Permanent {
                        url,
                        attempts: attempt,
                        reason,
                    });
                }
                Err(permanent) => return Err(permanent),
            }
        }
    }

    /// Makes a single GET request and classifies the outcome
    async fn fetch_once(&self, url: &str, attempt: u32) -> Result<String, FetchError> {
        let transient = |reason: String| FetchError::Transient {
            url: url.to_string(),
            attempt,
            reason,
        };

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                return Err(FetchError::Permanent {
                    url: url.to_string(),
                    attempts: attempt,
                    reason: e.to_string(),
                })
            }
            Err(e) if e.is_timeout() => return Err(transient("Request timeout".to_string())),
            Err(e) if e.is_connect() => return Err(transient(format!("Connection failed: {}", e))),
            Err(e) => return Err(transient(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return if is_retryable_status(status) {
                Err(transient(format!("HTTP {}", status.as_u16())))
            } else {
                Err(FetchError::Permanent {
                    url: url.to_string(),
                    attempts: attempt,
                    reason: format!("HTTP {}", status.as_u16()),
                })
            };
        }

        response
            .text()
            .await
            .map_err(|e| transient(format!("Failed to read body: {}", e)))
    }
}

/// Statuses worth another attempt
///
/// 403 is how the site answers a client it has temporarily banned, so it
/// waits out the backoff like 429. 404 and the remaining 4xx fail at once.
fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::FORBIDDEN | StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS
    ) || status.is_server_error()
}
