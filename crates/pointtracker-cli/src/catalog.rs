//! Catalog command handlers for the CLI.

use std::sync::Arc;

use clap::Subcommand;
use pointtracker_core::{AppConfig, CatalogStats};
use pointtracker_db::PgCatalogStore;
use pointtracker_scraper::{spawn_catalog_refresh, CatalogScraper, ScrapeOptions};

/// Sub-commands available under `catalog`.
#[derive(Debug, Subcommand)]
pub enum CatalogCommands {
    /// Crawl every card in the sitemap and persist the results
    Refresh {
        /// Apply the AI override to each card
        #[arg(long)]
        ai: bool,
    },
    /// Summarize the stored catalog
    Stats,
}

/// Runs a full catalog refresh and prints the run summary.
///
/// The crawl runs as a detached task; this command waits for it.
///
/// # Errors
///
/// Returns an error if the database or scraper cannot be set up, the sitemap
/// cannot be fetched, or the task panics. Per-card failures are logged and
/// reported in the summary, not propagated.
pub(crate) async fn run_catalog_refresh(config: &AppConfig, ai: bool) -> anyhow::Result<()> {
    super::warn_if_ai_unavailable(config, ai);
    let pool = super::connect_and_migrate(config).await?;
    let store = Arc::new(PgCatalogStore::new(pool));

    let scraper = CatalogScraper::from_config(config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to set up scraper: {e}"))?;

    tracing::info!(sitemap = %config.sitemap_url(), ai, "catalog refresh started");
    let handle = spawn_catalog_refresh(scraper, store, ScrapeOptions { use_ai: ai });
    let report = handle.await??;

    println!(
        "catalog refresh complete: {} candidates, {} parsed, {} failed, {} saved ({} save errors)",
        report.candidates,
        report.records.len(),
        report.failed_urls.len(),
        report.persisted,
        report.persist_failures
    );
    for url in &report.failed_urls {
        println!("  failed: {url}");
    }
    Ok(())
}

/// Prints aggregate figures over the stored catalog.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_catalog_stats(config: &AppConfig) -> anyhow::Result<()> {
    let pool = super::connect_and_migrate(config).await?;
    let records = pointtracker_db::list_scraped_cards(&pool).await?;
    let marker = pointtracker_db::get_catalog_refresh(&pool).await?;

    if records.is_empty() {
        println!("no cards stored; run `catalog refresh` first");
        return Ok(());
    }

    let stats = CatalogStats::from_records(&records);
    println!("{}", format_stats(&stats, marker.map(|m| m.completed_at)));
    Ok(())
}

fn format_stats(stats: &CatalogStats, refreshed_at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    let rows: String = stats
        .by_bank
        .iter()
        .map(|(bank, count)| format!("\n{:<10}{count}", bank.as_str()))
        .collect();
    format!(
        "cards: {}\nwith welcome bonus: {} (first-year total: {} $)\nno annual cost: {}\nlast refresh: {}\n\n{:<10}CARDS{rows}",
        stats.total_cards,
        stats.with_welcome_bonus,
        stats.total_welcome_value_y1,
        stats.with_no_annual_cost,
        refreshed_at.map_or_else(
            || "never".to_string(),
            |t| t.format("%Y-%m-%d %H:%M UTC").to_string()
        ),
        "BANK"
    )
}
