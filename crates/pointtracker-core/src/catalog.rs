//! Catalog store contract and catalog-level summaries.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cards::{Bank, BonusLevel, ExtractedCardRecord, StoredCard};

/// Write-side contract the crawl pipeline needs from the catalog store.
///
/// Upserts are keyed by slug, so a single-card refresh and a full-catalog run
/// may interleave: the last write for a slug wins. Bonus levels are never
/// merged with prior tiers; callers delete them all and insert the fresh set.
pub trait CatalogStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn upsert_card(
        &self,
        slug: &str,
        record: &ExtractedCardRecord,
    ) -> impl Future<Output = Result<StoredCard, Self::Error>> + Send;

    fn delete_all_bonus_levels(
        &self,
        card_id: i64,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn insert_bonus_levels(
        &self,
        card_id: i64,
        levels: &[BonusLevel],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn upsert_refresh_marker(
        &self,
        completed_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Aggregate figures over a set of catalog cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_cards: usize,
    pub by_bank: BTreeMap<Bank, usize>,
    /// Sum of first-year welcome values, excluding cards flagged as having no bonus.
    pub total_welcome_value_y1: u64,
    pub with_welcome_bonus: usize,
    /// Cards whose annual cost is unknown or zero.
    pub with_no_annual_cost: usize,
}

impl CatalogStats {
    #[must_use]
    pub fn from_records(records: &[ExtractedCardRecord]) -> Self {
        let mut stats = CatalogStats {
            total_cards: records.len(),
            ..CatalogStats::default()
        };

        for record in records {
            *stats.by_bank.entry(record.bank).or_insert(0) += 1;

            if let Some(y1) = record.welcome_value_y1 {
                if !record.no_welcome_bonus {
                    stats.total_welcome_value_y1 += u64::from(y1);
                    stats.with_welcome_bonus += 1;
                }
            }

            if matches!(record.annual_cost, None | Some(0)) {
                stats.with_no_annual_cost += 1;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardNetwork, PointsType};

    fn record(bank: Bank, y1: Option<u32>, annual_cost: Option<u32>) -> ExtractedCardRecord {
        ExtractedCardRecord {
            card_name: "Test".to_string(),
            network: CardNetwork::Visa,
            bank,
            points_type: PointsType::Aeroplan,
            annual_cost,
            welcome_value_y1: y1,
            welcome_value_y2: None,
            no_welcome_bonus: false,
            min_spend: None,
            min_spend_notes: None,
            bonus_details: None,
            bonus_levels: vec![],
            subscribe_url: None,
            milesopedia_url: None,
            milesopedia_slug: None,
            first_year_free: false,
            lounge_access: false,
            lounge_access_details: None,
            no_foreign_transaction_fee: false,
            travel_insurance: false,
            travel_insurance_details: None,
            annual_travel_credit: None,
            is_business: false,
        }
    }

    #[test]
    fn empty_catalog_has_zero_stats() {
        assert_eq!(CatalogStats::from_records(&[]), CatalogStats::default());
    }

    #[test]
    fn counts_by_bank_and_sums_welcome_values() {
        let records = vec![
            record(Bank::Td, Some(500), Some(139)),
            record(Bank::Td, None, None),
            record(Bank::Rbc, Some(1_200), Some(0)),
        ];
        let stats = CatalogStats::from_records(&records);
        assert_eq!(stats.total_cards, 3);
        assert_eq!(stats.by_bank[&Bank::Td], 2);
        assert_eq!(stats.by_bank[&Bank::Rbc], 1);
        assert_eq!(stats.total_welcome_value_y1, 1_700);
        assert_eq!(stats.with_welcome_bonus, 2);
        assert_eq!(stats.with_no_annual_cost, 2);
    }

    #[test]
    fn no_welcome_bonus_cards_are_excluded_from_bonus_totals() {
        let mut flagged = record(Bank::Scotia, Some(0), Some(0));
        flagged.no_welcome_bonus = true;
        let stats = CatalogStats::from_records(&[flagged]);
        assert_eq!(stats.with_welcome_bonus, 0);
        assert_eq!(stats.total_welcome_value_y1, 0);
    }
}
