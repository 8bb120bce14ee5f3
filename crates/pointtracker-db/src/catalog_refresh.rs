//! The singleton `catalog_refresh` row.

use chrono::{DateTime, Utc};
use pointtracker_core::CatalogRefreshMarker;
use sqlx::PgPool;

use crate::DbError;

/// Writes the completion time of the latest full catalog run.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_catalog_refresh(
    pool: &PgPool,
    completed_at: DateTime<Utc>,
) -> Result<CatalogRefreshMarker, DbError> {
    let completed_at: DateTime<Utc> = sqlx::query_scalar(
        "INSERT INTO catalog_refresh (id, completed_at) \
         VALUES ($1, $2) \
         ON CONFLICT (id) DO UPDATE SET completed_at = EXCLUDED.completed_at \
         RETURNING completed_at",
    )
    .bind(CatalogRefreshMarker::ID)
    .bind(completed_at)
    .fetch_one(pool)
    .await?;

    tracing::debug!(%completed_at, "catalog refresh marker saved");
    Ok(CatalogRefreshMarker::new(completed_at))
}

/// Returns the refresh marker, or `None` if no full run has completed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_catalog_refresh(pool: &PgPool) -> Result<Option<CatalogRefreshMarker>, DbError> {
    let completed_at: Option<DateTime<Utc>> =
        sqlx::query_scalar("SELECT completed_at FROM catalog_refresh WHERE id = $1")
            .bind(CatalogRefreshMarker::ID)
            .fetch_optional(pool)
            .await?;

    Ok(completed_at.map(CatalogRefreshMarker::new))
}
