//! Single-card scrape.

use chrono::{DateTime, Utc};
use pointtracker_core::{slug_from_url, AppConfig};
use pointtracker_db::PgCatalogStore;
use pointtracker_scraper::{persist_record, CatalogScraper, ScrapeOptions};

/// Scrapes one card page, prints its record as JSON, and optionally saves it,
/// reporting whether the slug was already stored.
///
/// # Errors
///
/// Returns an error if the page cannot be fetched, or if `save` is set and
/// the database write fails.
pub(crate) async fn run_card(
    config: &AppConfig,
    url: &str,
    ai: bool,
    save: bool,
) -> anyhow::Result<()> {
    super::warn_if_ai_unavailable(config, ai);

    let scraper = CatalogScraper::from_config(config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to set up scraper: {e}"))?;
    let result = scraper
        .scrape_single_card(url, ScrapeOptions { use_ai: ai })
        .await;
    scraper.close().await;
    let record = result.map_err(|e| anyhow::anyhow!("failed to scrape {url}: {e}"))?;

    println!("{}", serde_json::to_string_pretty(&record)?);

    if save {
        let slug = record
            .milesopedia_slug
            .clone()
            .unwrap_or_else(|| slug_from_url(url));
        let pool = super::connect_and_migrate(config).await?;
        let previous = pointtracker_db::get_scraped_card_by_slug(&pool, &slug).await?;
        let store = PgCatalogStore::new(pool);
        let stored = persist_record(&store, &slug, &record).await?;
        tracing::info!(slug = %stored.slug, id = stored.id, "card saved");
        println!(
            "{}",
            save_summary(&stored.slug, previous.map(|row| row.updated_at))
        );
    }

    Ok(())
}

/// One line telling whether the save added the card or replaced an earlier
/// scrape of it.
fn save_summary(slug: &str, previously_saved: Option<DateTime<Utc>>) -> String {
    match previously_saved {
        Some(at) => format!(
            "updated {slug} (previous scrape {})",
            at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => format!("added {slug}"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn first_save_reports_an_added_card() {
        assert_eq!(save_summary("carte-cobalt", None), "added carte-cobalt");
    }

    #[test]
    fn repeat_save_reports_the_previous_scrape_time() {
        let at = Utc.with_ymd_and_hms(2026, 2, 14, 8, 5, 0).unwrap();
        assert_eq!(
            save_summary("carte-cobalt", Some(at)),
            "updated carte-cobalt (previous scrape 2026-02-14 08:05 UTC)"
        );
    }
}
