//! Catalog crawl: sitemap discovery, batched fetch and parse, incremental
//! persistence, and the refresh marker.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use pointtracker_core::{
    AppConfig, CardListingCandidate, CatalogStore, ExtractedCardRecord, StoredCard,
    MAX_SCRAPER_CONCURRENCY,
};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::ai::AiExtractor;
use crate::error::ScraperError;
use crate::fetch::PageFetcher;
use crate::parse::parse_card_detail;
use crate::sitemap::parse_sitemap;

/// Per-call switches for a scrape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeOptions {
    /// Run the AI override when an extractor is configured.
    pub use_ai: bool,
}

#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub base_url: String,
    pub sitemap_url: String,
    /// Pages fetched concurrently per batch, within `1..=MAX_SCRAPER_CONCURRENCY`.
    pub concurrency: usize,
    /// Pause between batches, not between requests.
    pub batch_delay: Duration,
}

impl CrawlSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.scraper_base_url.clone(),
            sitemap_url: config.sitemap_url(),
            concurrency: config.scraper_concurrency,
            batch_delay: Duration::from_millis(config.scraper_rate_limit_ms),
        }
    }
}

/// Outcome of a full catalog run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport {
    pub candidates: usize,
    /// Successfully parsed records, in sitemap order.
    pub records: Vec<ExtractedCardRecord>,
    pub failed_urls: Vec<String>,
    pub persisted: usize,
    pub persist_failures: usize,
    pub completed_at: DateTime<Utc>,
}

pub struct CatalogScraper {
    fetcher: PageFetcher,
    ai: Option<AiExtractor>,
    settings: CrawlSettings,
}

impl CatalogScraper {
    #[must_use]
    pub fn new(fetcher: PageFetcher, ai: Option<AiExtractor>, settings: CrawlSettings) -> Self {
        Self {
            fetcher,
            ai,
            settings,
        }
    }

    /// Builds the fetcher, the optional AI extractor, and the crawl settings
    /// from `config`.
    ///
    /// # Errors
    ///
    /// Propagates [`PageFetcher::from_config`] failures.
    pub async fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let fetcher = PageFetcher::from_config(config).await?;
        let ai = AiExtractor::from_config(config, fetcher.client().http().clone());
        Ok(Self::new(fetcher, ai, CrawlSettings::from_config(config)))
    }

    #[must_use]
    pub fn ai_enabled(&self) -> bool {
        self.ai.is_some()
    }

    /// Fetches the sitemap and returns the card pages it lists.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or [`ScraperError::Xml`] for a malformed
    /// sitemap.
    pub async fn discover_candidates(&self) -> Result<Vec<CardListingCandidate>, ScraperError> {
        let xml = self.fetcher.fetch_static(&self.settings.sitemap_url).await?;
        let candidates = parse_sitemap(&xml, &self.settings.base_url)?;
        tracing::info!(
            sitemap = %self.settings.sitemap_url,
            count = candidates.len(),
            "card candidates discovered"
        );
        Ok(candidates)
    }

    /// Fetches and parses one card page, then applies the AI override when
    /// asked for and available.
    ///
    /// # Errors
    ///
    /// Returns the page's fetch error. AI failures never surface here.
    pub async fn scrape_single_card(
        &self,
        url: &str,
        options: ScrapeOptions,
    ) -> Result<ExtractedCardRecord, ScraperError> {
        let html = self.fetcher.fetch_page(url).await?;
        let parsed = parse_card_detail(&html, url);
        let mut record = parsed.record;

        if options.use_ai {
            match &self.ai {
                Some(ai) => {
                    if let Some(found) = ai.extract(&parsed.body_text).await {
                        tracing::debug!(url, ?found, "AI override applied");
                        found.apply(&mut record);
                    }
                }
                None => tracing::debug!(url, "AI override requested but no API key configured"),
            }
        }

        Ok(record)
    }

    /// Crawls every card in the sitemap.
    ///
    /// Candidates are processed in batches of `concurrency`. Each batch is
    /// fetched concurrently, then its records are persisted before the next
    /// batch starts. A failed page is logged and left out; a failed write is
    /// logged and counted. The refresh marker is written once at the end.
    ///
    /// # Errors
    ///
    /// Fails only when the sitemap itself cannot be fetched or parsed.
    pub async fn scrape_all_cards<S: CatalogStore>(
        &self,
        store: &S,
        options: ScrapeOptions,
    ) -> Result<CrawlReport, ScraperError> {
        let candidates = self.discover_candidates().await?;
        let batch_size = self.settings.concurrency.clamp(1, MAX_SCRAPER_CONCURRENCY);
        let batches = candidates.len().div_ceil(batch_size);

        let mut records = Vec::new();
        let mut failed_urls = Vec::new();
        let mut persisted = 0usize;
        let mut persist_failures = 0usize;

        for (index, batch) in candidates.chunks(batch_size).enumerate() {
            if index > 0 && !self.settings.batch_delay.is_zero() {
                tokio::time::sleep(self.settings.batch_delay).await;
            }

            let results = join_all(
                batch
                    .iter()
                    .map(|candidate| self.scrape_single_card(&candidate.url, options)),
            )
            .await;

            for (candidate, result) in batch.iter().zip(results) {
                let record = match result {
                    Ok(record) => record,
                    Err(e) => {
                        tracing::warn!(url = %candidate.url, error = %e, "skipping card page");
                        failed_urls.push(candidate.url.clone());
                        continue;
                    }
                };

                match persist_record(store, &candidate.slug, &record).await {
                    Ok(stored) => {
                        persisted += 1;
                        tracing::debug!(
                            slug = %stored.slug,
                            card = %record.card_name,
                            bank = %record.bank,
                            "catalog card upserted"
                        );
                    }
                    Err(e) => {
                        persist_failures += 1;
                        tracing::warn!(slug = %candidate.slug, error = %e, "catalog upsert failed");
                    }
                }
                records.push(record);
            }

            tracing::info!(
                batch = index + 1,
                batches,
                parsed = records.len(),
                failed = failed_urls.len(),
                "catalog batch complete"
            );
        }

        let completed_at = Utc::now();
        if let Err(e) = store.upsert_refresh_marker(completed_at).await {
            tracing::warn!(error = %e, "failed to save catalog refresh marker");
        }

        tracing::info!(
            candidates = candidates.len(),
            parsed = records.len(),
            failed = failed_urls.len(),
            persisted,
            persist_failures,
            "catalog refresh finished"
        );

        Ok(CrawlReport {
            candidates: candidates.len(),
            records,
            failed_urls,
            persisted,
            persist_failures,
            completed_at,
        })
    }

    /// Releases the browser, if one was launched.
    pub async fn close(self) {
        self.fetcher.close().await;
    }
}

/// Upserts `record` under `slug` and replaces its bonus levels wholesale.
///
/// # Errors
///
/// Returns the first store error; levels may be left deleted if the insert
/// fails after the delete succeeded.
pub async fn persist_record<S: CatalogStore>(
    store: &S,
    slug: &str,
    record: &ExtractedCardRecord,
) -> Result<StoredCard, S::Error> {
    let stored = store.upsert_card(slug, record).await?;
    store.delete_all_bonus_levels(stored.id).await?;
    if !record.bonus_levels.is_empty() {
        store
            .insert_bonus_levels(stored.id, &record.bonus_levels)
            .await?;
    }
    Ok(stored)
}

/// Runs a full catalog refresh in the background and returns immediately.
/// The scraper is closed when the run ends.
pub fn spawn_catalog_refresh<S>(
    scraper: CatalogScraper,
    store: Arc<S>,
    options: ScrapeOptions,
) -> JoinHandle<Result<CrawlReport, ScraperError>>
where
    S: CatalogStore + 'static,
{
    tokio::spawn(async move {
        let result = scraper.scrape_all_cards(store.as_ref(), options).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "catalog refresh aborted");
        }
        scraper.close().await;
        result
    })
}
