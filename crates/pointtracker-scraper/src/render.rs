//! Headless-browser fetch for pages whose offer amount is injected client-side.
//!
//! One browser is launched per crawl and closed after it; every request gets
//! its own tab, opened and closed around the read.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::ScraperError;
use crate::fetch::poll_until;

/// Element that appears once the welcome-offer amount has been rendered.
pub const CONTENT_MARKER: &str = "#welcome_offer_year_one .text-black";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct HeadlessRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
    render_timeout: Duration,
}

impl HeadlessRenderer {
    /// Launches a headless Chromium.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Render`] if the browser cannot be configured
    /// or started.
    pub async fn launch(render_timeout: Duration) -> Result<Self, ScraperError> {
        let config = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .build()
            .map_err(|reason| ScraperError::Render {
                url: "about:blank".to_owned(),
                reason: format!("invalid browser config: {reason}"),
            })?;

        let (browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|e| ScraperError::Render {
                    url: "about:blank".to_owned(),
                    reason: format!("failed to launch browser: {e}"),
                })?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });
        tracing::info!(
            timeout_ms = u64::try_from(render_timeout.as_millis()).unwrap_or(u64::MAX),
            "headless browser launched"
        );

        Ok(Self {
            browser,
            handler,
            render_timeout,
        })
    }

    /// Opens `url` in a new tab, waits for [`CONTENT_MARKER`] or the render
    /// timeout (whichever comes first), and returns the rendered document.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Render`] if the tab cannot be opened or read.
    pub async fn render(&self, url: &str) -> Result<String, ScraperError> {
        let render_err = |reason: String| ScraperError::Render {
            url: url.to_owned(),
            reason,
        };

        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| render_err(format!("failed to open page: {e}")))?;

        let tab = &page;
        let marker_found = poll_until(self.render_timeout, POLL_INTERVAL, move || async move {
            tab.find_element(CONTENT_MARKER).await.is_ok()
        })
        .await;
        if !marker_found {
            tracing::debug!(url, "content marker not found before render timeout");
        }

        let content = page.content().await;
        if let Err(e) = page.close().await {
            tracing::warn!(url, error = %e, "failed to close browser tab");
        }
        content.map_err(|e| render_err(format!("failed to read content: {e}")))
    }

    /// Closes the browser and stops its event handler.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!(error = %e, "failed to close headless browser");
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!(error = %e, "headless browser did not exit cleanly");
        }
        self.handler.abort();
    }
}
