use crate::config::SourceConfig;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl FetchError {
    /// Rate limits, server errors and connection trouble are worth retrying.
    /// Other 4xx responses are not.
    fn is_transient(&self) -> bool {
        match self {
            FetchError::Status(s) => *s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error(),
            FetchError::Request(e) => e.is_timeout() || e.is_connect(),
        }
    }
}

pub struct HttpClient {
    inner: reqwest::Client,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl HttpClient {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            inner,
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    /// Fetch a URL as text, retrying transient failures with backoff.
    pub async fn get_text(&self, url: &Url) -> Result<String, FetchError> {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(self.retry_delay_ms.max(1))
            .max_delay(Duration::from_secs(30))
            .map(jitter)
            .take(self.max_retries as usize);

        let mut attempt = 0u32;
        RetryIf::start(
            strategy,
            || {
                attempt += 1;
                self.get_once(url, attempt)
            },
            |e: &FetchError| {
                let retry = e.is_transient();
                if retry {
                    warn!("GET {} failed: {}; retrying", url, e);
                }
                retry
            },
        )
        .await
    }

    async fn get_once(&self, url: &Url, attempt: u32) -> Result<String, FetchError> {
        debug!("GET {} (attempt {})", url, attempt);

        let resp = self.inner.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transience() {
        assert!(FetchError::Status(StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(FetchError::Status(StatusCode::BAD_GATEWAY).is_transient());
        assert!(!FetchError::Status(StatusCode::NOT_FOUND).is_transient());
        assert!(!FetchError::Status(StatusCode::UNAUTHORIZED).is_transient());
    }
}
