//! Fetch mode selection: static HTTP or headless render.

use std::future::Future;
use std::time::Duration;

use pointtracker_core::AppConfig;

use crate::client::PageClient;
use crate::error::ScraperError;
#[cfg(feature = "headless")]
use crate::render::HeadlessRenderer;

/// Page source for a crawl. The sitemap always goes through the static
/// client; detail pages use the renderer when one was launched.
pub enum PageFetcher {
    Static(PageClient),
    #[cfg(feature = "headless")]
    Rendered {
        client: PageClient,
        renderer: HeadlessRenderer,
    },
}

impl PageFetcher {
    /// Builds the fetcher `config` asks for, launching the browser when
    /// headless rendering is on.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`] if the HTTP client cannot be built.
    /// - [`ScraperError::Render`] if the browser fails to launch.
    /// - [`ScraperError::RendererUnavailable`] if rendering is requested in a
    ///   build without the `headless` feature.
    pub async fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let client = PageClient::from_config(config)?;
        if !config.scraper_headless {
            return Ok(Self::Static(client));
        }

        #[cfg(feature = "headless")]
        {
            let renderer =
                HeadlessRenderer::launch(Duration::from_millis(config.scraper_render_timeout_ms))
                    .await?;
            Ok(Self::Rendered { client, renderer })
        }

        #[cfg(not(feature = "headless"))]
        {
            drop(client);
            Err(ScraperError::RendererUnavailable)
        }
    }

    #[must_use]
    pub fn client(&self) -> &PageClient {
        match self {
            Self::Static(client) => client,
            #[cfg(feature = "headless")]
            Self::Rendered { client, .. } => client,
        }
    }

    /// Fetches a card detail page.
    ///
    /// # Errors
    ///
    /// Propagates the fetch or render failure for this page.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        match self {
            Self::Static(client) => client.fetch_text(url).await,
            #[cfg(feature = "headless")]
            Self::Rendered { renderer, .. } => {
                let url = PageClient::checked_url(url)?;
                renderer.render(url.as_str()).await
            }
        }
    }

    /// Fetches an XML document over plain HTTP, whatever the mode.
    ///
    /// # Errors
    ///
    /// Propagates the static fetch failure.
    pub async fn fetch_static(&self, url: &str) -> Result<String, ScraperError> {
        self.client().fetch_text(url).await
    }

    /// Releases the browser, if one was launched.
    pub async fn close(self) {
        match self {
            Self::Static(_) => {}
            #[cfg(feature = "headless")]
            Self::Rendered { renderer, .. } => renderer.close().await,
        }
    }
}

/// Runs `check` every `interval` until it holds or `limit` elapses. Returns
/// whether it held in time.
#[cfg_attr(not(feature = "headless"), allow(dead_code))]
pub(crate) async fn poll_until<F, Fut>(limit: Duration, interval: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(limit, async {
        loop {
            if check().await {
                return;
            }
            tokio::time::sleep(interval).await;
        }
    })
    .await
    .is_ok()
}
