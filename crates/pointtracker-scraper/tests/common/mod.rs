//! Shared fixtures for the scraper integration tests: an in-memory catalog
//! store that records every write, page builders, and a logging responder.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use pointtracker_core::{BonusLevel, CatalogStore, ExtractedCardRecord, StoredCard};
use pointtracker_scraper::{CatalogScraper, CrawlSettings, PageClient, PageFetcher};
use wiremock::{Request, Respond, ResponseTemplate};

pub const TEST_UA: &str = "pointtracker-test/0.1";

/// Ordered log shared between mock responders and the store.
pub type EventLog = Arc<Mutex<Vec<String>>>;

#[derive(Debug, thiserror::Error)]
#[error("store unavailable for {0}")]
pub struct StoreError(pub String);

#[derive(Default)]
pub struct MemoryStore {
    pub log: EventLog,
    pub cards: Mutex<BTreeMap<String, (i64, ExtractedCardRecord)>>,
    pub levels: Mutex<HashMap<i64, Vec<BonusLevel>>>,
    pub marker: Mutex<Option<DateTime<Utc>>>,
    pub upserted_slugs: Mutex<Vec<String>>,
    pub failing_slugs: Vec<String>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn with_log(log: EventLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn failing_on(slugs: &[&str]) -> Self {
        Self {
            failing_slugs: slugs.iter().map(|s| (*s).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn upserted(&self) -> Vec<String> {
        self.upserted_slugs.lock().unwrap().clone()
    }

    pub fn levels_for(&self, slug: &str) -> Vec<BonusLevel> {
        let id = self.cards.lock().unwrap()[slug].0;
        self.levels.lock().unwrap().get(&id).cloned().unwrap_or_default()
    }
}

impl CatalogStore for MemoryStore {
    type Error = StoreError;

    async fn upsert_card(
        &self,
        slug: &str,
        record: &ExtractedCardRecord,
    ) -> Result<StoredCard, StoreError> {
        if self.failing_slugs.iter().any(|s| s == slug) {
            return Err(StoreError(slug.to_string()));
        }
        self.log.lock().unwrap().push(format!("upsert:{slug}"));
        self.upserted_slugs.lock().unwrap().push(slug.to_string());

        let mut cards = self.cards.lock().unwrap();
        let id = match cards.get(slug) {
            Some((id, _)) => *id,
            None => self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        };
        cards.insert(slug.to_string(), (id, record.clone()));
        Ok(StoredCard {
            id,
            slug: slug.to_string(),
        })
    }

    async fn delete_all_bonus_levels(&self, card_id: i64) -> Result<(), StoreError> {
        self.levels.lock().unwrap().remove(&card_id);
        Ok(())
    }

    async fn insert_bonus_levels(
        &self,
        card_id: i64,
        levels: &[BonusLevel],
    ) -> Result<(), StoreError> {
        self.levels
            .lock()
            .unwrap()
            .entry(card_id)
            .or_default()
            .extend_from_slice(levels);
        Ok(())
    }

    async fn upsert_refresh_marker(&self, completed_at: DateTime<Utc>) -> Result<(), StoreError> {
        self.log.lock().unwrap().push("marker".to_string());
        *self.marker.lock().unwrap() = Some(completed_at);
        Ok(())
    }
}

/// Responds with a fixed HTML body and logs `fetch:<name>` on every hit.
pub struct LoggingPage {
    pub log: EventLog,
    pub name: String,
    pub body: String,
}

impl Respond for LoggingPage {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.log.lock().unwrap().push(format!("fetch:{}", self.name));
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/html; charset=utf-8")
            .set_body_string(self.body.clone())
    }
}

pub fn test_client(timeout: Duration, max_attempts: u32) -> PageClient {
    PageClient::new(timeout, TEST_UA, max_attempts, 0).expect("failed to build test PageClient")
}

pub fn test_scraper(base_url: &str, concurrency: usize, client: PageClient) -> CatalogScraper {
    CatalogScraper::new(
        PageFetcher::Static(client),
        None,
        CrawlSettings {
            base_url: base_url.to_string(),
            sitemap_url: format!("{base_url}/card-sitemap.xml"),
            concurrency,
            batch_delay: Duration::ZERO,
        },
    )
}

pub fn card_path(slug: &str) -> String {
    format!("/cartes-de-credit/{slug}/")
}

pub fn sitemap_xml(base_url: &str, slugs: &[&str]) -> String {
    let urls: String = slugs
        .iter()
        .map(|slug| {
            format!(
                "  <url>\n    <loc>{base_url}{path}</loc>\n    <xhtml:link rel=\"alternate\" hreflang=\"fr-CA\" href=\"{base_url}{path}\"/>\n  </url>\n",
                path = card_path(slug)
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n{urls}</urlset>"
    )
}

/// A small but realistic French card page.
pub fn card_page(name: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html lang="fr-CA"><head><title>{name} | Milesopedia</title></head>
<body>
<h1>{name}</h1>
<div class="offer">
  <div id="welcome_offer_year_one"><span class="text-black">1&nbsp;000&nbsp;$</span></div>
  <div><span class="text-black">250 $</span></div>
</div>
<ul>
  <li>Obtenez 10 000 points lorsque vous dépensez 1 500 $ au cours des 3 premiers mois</li>
  <li>Obtenez 20 000 points lorsque vous dépensez 7 500 $ au cours des 12 premiers mois</li>
</ul>
<p>Frais annuels 139 $</p>
<p>Assurance voyage incluse pour vous et votre famille lors de vos déplacements à l'étranger.</p>
</body></html>"#
    )
}
