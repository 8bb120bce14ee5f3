//! Catalog ingestion for the points tracker: sitemap discovery, page fetch,
//! multi-strategy field extraction, and the batched crawl.

pub mod ai;
pub mod bounds;
pub mod client;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod keywords;
pub mod normalize;
pub mod parse;
pub(crate) mod rate_limit;
#[cfg(feature = "headless")]
pub mod render;
pub mod sitemap;

pub use ai::{parse_ai_response, AiExtractor, AiOverride};
pub use client::PageClient;
pub use crawl::{
    persist_record, spawn_catalog_refresh, CatalogScraper, CrawlReport, CrawlSettings,
    ScrapeOptions,
};
pub use error::ScraperError;
pub use fetch::PageFetcher;
pub use keywords::match_map;
pub use normalize::{extract_dollar_value, extract_number, normalize, normalize_spaces};
pub use parse::{parse_card_detail, ParsedCardPage};
pub use rate_limit::is_transient;
pub use sitemap::parse_sitemap;
