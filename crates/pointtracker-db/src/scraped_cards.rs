//! Database operations for `scraped_cards` and `scraped_bonus_levels`, and
//! the Postgres [`CatalogStore`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use pointtracker_core::{BonusLevel, CatalogStore, ExtractedCardRecord, StoredCard};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `scraped_cards` table.
///
/// Enum columns hold the catalog identifiers (`"VISA"`, `"Scotia"`,
/// `"Amex_Privileges"`, ...). Amount columns are `BIGINT` so every `u32`
/// fits without loss.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScrapedCardRow {
    pub id: i64,
    pub slug: String,
    pub card_name: String,
    pub network: String,
    pub bank: String,
    pub points_type: String,
    pub annual_cost: Option<i64>,
    pub welcome_value_y1: Option<i64>,
    pub welcome_value_y2: Option<i64>,
    pub no_welcome_bonus: bool,
    pub min_spend: Option<i64>,
    pub min_spend_notes: Option<String>,
    pub bonus_details: Option<String>,
    pub subscribe_url: Option<String>,
    pub milesopedia_url: Option<String>,
    pub first_year_free: bool,
    pub lounge_access: bool,
    pub lounge_access_details: Option<String>,
    pub no_foreign_transaction_fee: bool,
    pub travel_insurance: bool,
    pub travel_insurance_details: Option<String>,
    pub annual_travel_credit: Option<i64>,
    pub is_business: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `scraped_bonus_levels` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BonusLevelRow {
    pub id: i64,
    pub scraped_card_id: i64,
    pub level_order: i64,
    pub spend_amount: Option<i64>,
    pub months_from_open: Option<i64>,
    pub reward_points: Option<i64>,
}

impl BonusLevelRow {
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] if a stored value does not fit a `u32`.
    pub fn to_level(&self) -> Result<BonusLevel, DbError> {
        Ok(BonusLevel {
            order: to_u32("level_order", self.level_order)?,
            spend_amount: opt_u32("spend_amount", self.spend_amount)?,
            months_from_open: opt_u32("months_from_open", self.months_from_open)?,
            reward_points: opt_u32("reward_points", self.reward_points)?,
        })
    }
}

impl ScrapedCardRow {
    /// Rebuilds the catalog record from this row and its bonus levels.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] for an unknown enum identifier or an
    /// amount that does not fit a `u32`.
    pub fn into_record(self, levels: &[BonusLevelRow]) -> Result<ExtractedCardRecord, DbError> {
        let bonus_levels = levels
            .iter()
            .map(BonusLevelRow::to_level)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ExtractedCardRecord {
            network: parse_column("network", &self.network)?,
            bank: parse_column("bank", &self.bank)?,
            points_type: parse_column("points_type", &self.points_type)?,
            annual_cost: opt_u32("annual_cost", self.annual_cost)?,
            welcome_value_y1: opt_u32("welcome_value_y1", self.welcome_value_y1)?,
            welcome_value_y2: opt_u32("welcome_value_y2", self.welcome_value_y2)?,
            min_spend: opt_u32("min_spend", self.min_spend)?,
            annual_travel_credit: opt_u32("annual_travel_credit", self.annual_travel_credit)?,
            card_name: self.card_name,
            no_welcome_bonus: self.no_welcome_bonus,
            min_spend_notes: self.min_spend_notes,
            bonus_details: self.bonus_details,
            bonus_levels,
            subscribe_url: self.subscribe_url,
            milesopedia_url: self.milesopedia_url,
            milesopedia_slug: Some(self.slug),
            first_year_free: self.first_year_free,
            lounge_access: self.lounge_access,
            lounge_access_details: self.lounge_access_details,
            no_foreign_transaction_fee: self.no_foreign_transaction_fee,
            travel_insurance: self.travel_insurance,
            travel_insurance_details: self.travel_insurance_details,
            is_business: self.is_business,
        })
    }
}

fn parse_column<T>(column: &'static str, value: &str) -> Result<T, DbError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| DbError::InvalidRow {
        column,
        reason: e.to_string(),
    })
}

fn to_u32(column: &'static str, value: i64) -> Result<u32, DbError> {
    u32::try_from(value).map_err(|_| DbError::InvalidRow {
        column,
        reason: format!("{value} is out of range"),
    })
}

fn opt_u32(column: &'static str, value: Option<i64>) -> Result<Option<u32>, DbError> {
    value.map(|v| to_u32(column, v)).transpose()
}

const CARD_COLUMNS: &str = "id, slug, card_name, network, bank, points_type, annual_cost, \
     welcome_value_y1, welcome_value_y2, no_welcome_bonus, min_spend, min_spend_notes, \
     bonus_details, subscribe_url, milesopedia_url, first_year_free, lounge_access, \
     lounge_access_details, no_foreign_transaction_fee, travel_insurance, \
     travel_insurance_details, annual_travel_credit, is_business, created_at, updated_at";

// ---------------------------------------------------------------------------
// scraped_cards operations
// ---------------------------------------------------------------------------

/// Upserts a card row keyed by `slug`. Every scraped column is overwritten on
/// conflict, so the last write for a slug wins.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_scraped_card(
    pool: &PgPool,
    slug: &str,
    record: &ExtractedCardRecord,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO scraped_cards \
             (slug, card_name, network, bank, points_type, annual_cost, \
              welcome_value_y1, welcome_value_y2, no_welcome_bonus, min_spend, min_spend_notes, \
              bonus_details, subscribe_url, milesopedia_url, first_year_free, lounge_access, \
              lounge_access_details, no_foreign_transaction_fee, travel_insurance, \
              travel_insurance_details, annual_travel_credit, is_business) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, \
                 $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22) \
         ON CONFLICT (slug) DO UPDATE SET \
             card_name                  = EXCLUDED.card_name, \
             network                    = EXCLUDED.network, \
             bank                       = EXCLUDED.bank, \
             points_type                = EXCLUDED.points_type, \
             annual_cost                = EXCLUDED.annual_cost, \
             welcome_value_y1           = EXCLUDED.welcome_value_y1, \
             welcome_value_y2           = EXCLUDED.welcome_value_y2, \
             no_welcome_bonus           = EXCLUDED.no_welcome_bonus, \
             min_spend                  = EXCLUDED.min_spend, \
             min_spend_notes            = EXCLUDED.min_spend_notes, \
             bonus_details              = EXCLUDED.bonus_details, \
             subscribe_url              = EXCLUDED.subscribe_url, \
             milesopedia_url            = EXCLUDED.milesopedia_url, \
             first_year_free            = EXCLUDED.first_year_free, \
             lounge_access              = EXCLUDED.lounge_access, \
             lounge_access_details      = EXCLUDED.lounge_access_details, \
             no_foreign_transaction_fee = EXCLUDED.no_foreign_transaction_fee, \
             travel_insurance           = EXCLUDED.travel_insurance, \
             travel_insurance_details   = EXCLUDED.travel_insurance_details, \
             annual_travel_credit       = EXCLUDED.annual_travel_credit, \
             is_business                = EXCLUDED.is_business, \
             updated_at                 = NOW() \
         RETURNING id",
    )
    .bind(slug)
    .bind(&record.card_name)
    .bind(record.network.as_str())
    .bind(record.bank.as_str())
    .bind(record.points_type.as_str())
    .bind(record.annual_cost.map(i64::from))
    .bind(record.welcome_value_y1.map(i64::from))
    .bind(record.welcome_value_y2.map(i64::from))
    .bind(record.no_welcome_bonus)
    .bind(record.min_spend.map(i64::from))
    .bind(record.min_spend_notes.as_deref())
    .bind(record.bonus_details.as_deref())
    .bind(record.subscribe_url.as_deref())
    .bind(record.milesopedia_url.as_deref())
    .bind(record.first_year_free)
    .bind(record.lounge_access)
    .bind(record.lounge_access_details.as_deref())
    .bind(record.no_foreign_transaction_fee)
    .bind(record.travel_insurance)
    .bind(record.travel_insurance_details.as_deref())
    .bind(record.annual_travel_credit.map(i64::from))
    .bind(record.is_business)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns a single card row by slug, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_scraped_card_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<ScrapedCardRow>, DbError> {
    let row = sqlx::query_as::<_, ScrapedCardRow>(&format!(
        "SELECT {CARD_COLUMNS} FROM scraped_cards WHERE slug = $1"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns every stored card with its bonus levels, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails, or [`DbError::InvalidRow`] if
/// a stored row cannot be converted back into a record.
pub async fn list_scraped_cards(pool: &PgPool) -> Result<Vec<ExtractedCardRecord>, DbError> {
    let cards = sqlx::query_as::<_, ScrapedCardRow>(&format!(
        "SELECT {CARD_COLUMNS} FROM scraped_cards ORDER BY card_name, slug"
    ))
    .fetch_all(pool)
    .await?;

    let levels = sqlx::query_as::<_, BonusLevelRow>(
        "SELECT id, scraped_card_id, level_order, spend_amount, months_from_open, reward_points \
         FROM scraped_bonus_levels \
         ORDER BY scraped_card_id, level_order",
    )
    .fetch_all(pool)
    .await?;

    let mut by_card: HashMap<i64, Vec<BonusLevelRow>> = HashMap::new();
    for level in levels {
        by_card.entry(level.scraped_card_id).or_default().push(level);
    }

    cards
        .into_iter()
        .map(|card| {
            let levels = by_card.remove(&card.id).unwrap_or_default();
            card.into_record(&levels)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// scraped_bonus_levels operations
// ---------------------------------------------------------------------------

/// Deletes every bonus level of a card.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_bonus_levels(pool: &PgPool, card_id: i64) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM scraped_bonus_levels WHERE scraped_card_id = $1")
        .bind(card_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Inserts `levels` for a card in one transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; nothing is written then.
pub async fn insert_bonus_levels(
    pool: &PgPool,
    card_id: i64,
    levels: &[BonusLevel],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;
    for level in levels {
        sqlx::query(
            "INSERT INTO scraped_bonus_levels \
                 (scraped_card_id, level_order, spend_amount, months_from_open, reward_points) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(card_id)
        .bind(i64::from(level.order))
        .bind(level.spend_amount.map(i64::from))
        .bind(level.months_from_open.map(i64::from))
        .bind(level.reward_points.map(i64::from))
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CatalogStore
// ---------------------------------------------------------------------------

/// [`CatalogStore`] over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CatalogStore for PgCatalogStore {
    type Error = DbError;

    async fn upsert_card(
        &self,
        slug: &str,
        record: &ExtractedCardRecord,
    ) -> Result<StoredCard, DbError> {
        let id = upsert_scraped_card(&self.pool, slug, record).await?;
        Ok(StoredCard {
            id,
            slug: slug.to_string(),
        })
    }

    async fn delete_all_bonus_levels(&self, card_id: i64) -> Result<(), DbError> {
        delete_bonus_levels(&self.pool, card_id).await?;
        Ok(())
    }

    async fn insert_bonus_levels(&self, card_id: i64, levels: &[BonusLevel]) -> Result<(), DbError> {
        insert_bonus_levels(&self.pool, card_id, levels).await
    }

    async fn upsert_refresh_marker(&self, completed_at: DateTime<Utc>) -> Result<(), DbError> {
        crate::catalog_refresh::upsert_catalog_refresh(&self.pool, completed_at).await?;
        Ok(())
    }
}
