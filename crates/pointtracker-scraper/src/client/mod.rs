//! Static HTTP fetch for catalog pages and the sitemap.

use std::time::Duration;

use pointtracker_core::AppConfig;
use reqwest::Client;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "fr-CA,fr;q=0.9,en;q=0.8";

/// Plain HTTP client for the catalog site.
///
/// 404 maps to [`ScraperError::NotFound`] and any other non-2xx status to
/// [`ScraperError::UnexpectedStatus`]; neither is retried. Network-level
/// failures are retried with linear backoff up to `max_attempts` in total.
#[derive(Debug, Clone)]
pub struct PageClient {
    client: Client,
    max_attempts: u32,
    /// Base delay for linear backoff: the wait after attempt `n` is `n × backoff_ms`.
    backoff_ms: u64,
}

impl PageClient {
    /// Creates a `PageClient` with a per-request timeout, `User-Agent`, and
    /// retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout: Duration,
        user_agent: &str,
        max_attempts: u32,
        backoff_ms: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_attempts: max_attempts.max(1),
            backoff_ms,
        })
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            Duration::from_secs(config.scraper_request_timeout_secs),
            &config.scraper_user_agent,
            config.scraper_max_attempts,
            config.scraper_retry_backoff_ms,
        )
    }

    /// The underlying `reqwest` client, shared with the AI override.
    #[must_use]
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Fetches `url` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if `url` is not an absolute http(s) URL.
    /// - [`ScraperError::NotFound`] for HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`] for any other non-2xx status (not retried).
    /// - [`ScraperError::Http`] for a network failure after all attempts.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ScraperError> {
        let url = Self::checked_url(url)?;

        retry_with_backoff(self.max_attempts, self.backoff_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.as_str())
                    .header(reqwest::header::ACCEPT, ACCEPT_HTML)
                    .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound {
                        url: url.to_string(),
                    });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await
    }

    /// Parses `url`, accepting only absolute `http` and `https` URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] otherwise.
    pub(crate) fn checked_url(url: &str) -> Result<reqwest::Url, ScraperError> {
        let parsed = reqwest::Url::parse(url.trim()).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScraperError::InvalidUrl {
                url: url.to_owned(),
                reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
            });
        }
        Ok(parsed)
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
