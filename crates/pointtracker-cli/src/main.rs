mod card;
mod catalog;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::catalog::CatalogCommands;

#[derive(Debug, Parser)]
#[command(name = "pointtracker-cli")]
#[command(about = "Credit-card catalog scraper for the points tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Full-catalog operations
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Scrape a single card page and print the record as JSON
    Card {
        /// Card detail page URL
        url: String,
        /// Apply the AI override to the spend and first-year fields
        #[arg(long)]
        ai: bool,
        /// Persist the record to the catalog
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = pointtracker_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Catalog {
            command: CatalogCommands::Refresh { ai },
        } => catalog::run_catalog_refresh(&config, ai).await,
        Commands::Catalog {
            command: CatalogCommands::Stats,
        } => catalog::run_catalog_stats(&config).await,
        Commands::Card { url, ai, save } => card::run_card(&config, &url, ai, save).await,
    }
}

/// Connects to Postgres and applies pending migrations.
async fn connect_and_migrate(
    config: &pointtracker_core::AppConfig,
) -> anyhow::Result<sqlx::PgPool> {
    let (pool, applied) = pointtracker_db::open_catalog(config).await?;
    if applied > 0 {
        tracing::info!(applied, "database migrations applied");
    }
    Ok(pool)
}

/// Warns when `--ai` was passed but no API key is configured.
fn warn_if_ai_unavailable(config: &pointtracker_core::AppConfig, requested: bool) {
    if requested && !config.ai_enabled() {
        tracing::warn!("ANTHROPIC_API_KEY is not set; continuing without the AI override");
    }
}

#[cfg(test)]
mod tests;
