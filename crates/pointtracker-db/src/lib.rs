//! Postgres persistence for the scraped card catalog: the card and bonus-level
//! tables, the refresh marker, and the pool they share.

pub mod catalog_refresh;
pub mod scraped_cards;

use std::time::Duration;

use pointtracker_core::AppConfig;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

pub use catalog_refresh::{get_catalog_refresh, upsert_catalog_refresh};
pub use scraped_cards::{
    delete_bonus_levels, get_scraped_card_by_slug, insert_bonus_levels, list_scraped_cards,
    upsert_scraped_card, BonusLevelRow, PgCatalogStore, ScrapedCardRow,
};

/// Catalog schema, embedded from the workspace `migrations/` directory.
static CATALOG_SCHEMA: Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid stored value in {column}: {reason}")]
    InvalidRow { column: &'static str, reason: String },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("catalog schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Pool sizing taken from the `POINTTRACKER_DB_*` settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl PoolSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections.min(config.db_max_connections),
            acquire_timeout: Duration::from_secs(config.db_acquire_timeout_secs),
        }
    }

    fn options(self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// Connects to the catalog database and applies any pending schema
/// migrations. Returns the pool and how many migrations this call applied.
///
/// # Errors
///
/// - [`DbError::Sqlx`] if the connection cannot be established.
/// - [`DbError::Migration`] if a migration fails.
pub async fn open_catalog(config: &AppConfig) -> Result<(PgPool, usize), DbError> {
    let pool = PoolSettings::from_config(config)
        .options()
        .connect(&config.database_url)
        .await?;
    let applied = migrate_catalog(&pool).await?;
    Ok((pool, applied))
}

/// Applies pending catalog migrations and returns how many ran.
///
/// # Errors
///
/// - [`DbError::Sqlx`] if the applied versions cannot be read.
/// - [`DbError::Migration`] if a migration fails.
pub async fn migrate_catalog(pool: &PgPool) -> Result<usize, DbError> {
    let has_ledger: bool =
        sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await?;
    let applied: Vec<i64> = if has_ledger {
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success")
            .fetch_all(pool)
            .await?
    } else {
        Vec::new()
    };

    let pending = pending_migrations(&applied);
    CATALOG_SCHEMA.run(pool).await?;
    Ok(pending)
}

/// Embedded up-migrations whose version is not in `applied`.
fn pending_migrations(applied: &[i64]) -> usize {
    CATALOG_SCHEMA
        .iter()
        .filter(|m| !m.migration_type.is_down_migration() && !applied.contains(&m.version))
        .count()
}
