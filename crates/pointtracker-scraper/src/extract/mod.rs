//! Independent field extractors and the precedence merge.
//!
//! Each extractor reads one view of the page (raw source, slug, card name,
//! parsed DOM, body text) and returns a [`PartialCard`] holding only the
//! fields it found. [`merge`] folds the partials highest-precedence first,
//! keeping the first in-bounds value per field.

pub mod body_text;
pub mod bonus;
pub mod dom;
pub mod embedded;
pub mod features;
pub mod name;
pub mod raw_html;
pub mod slug;

use pointtracker_core::{Bank, CardNetwork, PointsType};

use crate::bounds::{self, Bound};

/// Every field an extractor may contribute. `None` means "not found here".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialCard {
    pub network: Option<CardNetwork>,
    pub bank: Option<Bank>,
    pub points_type: Option<PointsType>,
    pub annual_cost: Option<u32>,
    pub welcome_value_y1: Option<u32>,
    pub welcome_value_y2: Option<u32>,
    pub welcome_bonus_points: Option<u32>,
    pub min_spend: Option<u32>,
    pub subscribe_url: Option<String>,
    pub first_year_free: Option<bool>,
    pub lounge_access: Option<bool>,
    pub lounge_access_details: Option<String>,
    pub no_foreign_transaction_fee: Option<bool>,
    pub travel_insurance: Option<bool>,
    pub travel_insurance_details: Option<String>,
    pub annual_travel_credit: Option<u32>,
    pub is_business: Option<bool>,
    pub no_welcome_bonus: Option<bool>,
}

/// Folds `layers` in order; the first layer holding an acceptable value for a
/// field wins. Numbers outside their bound and blank strings count as absent,
/// letting a lower layer supply the field.
#[must_use]
pub fn merge(layers: &[PartialCard]) -> PartialCard {
    let mut merged = PartialCard::default();
    for layer in layers {
        merged.fill_from(layer);
    }
    merged
}

impl PartialCard {
    fn fill_from(&mut self, other: &PartialCard) {
        fill(&mut self.network, other.network);
        fill(&mut self.bank, other.bank);
        fill(&mut self.points_type, other.points_type);
        fill_bounded(&mut self.annual_cost, other.annual_cost, bounds::ANNUAL_COST);
        fill_bounded(
            &mut self.welcome_value_y1,
            other.welcome_value_y1,
            bounds::WELCOME_VALUE_Y1,
        );
        fill_bounded(
            &mut self.welcome_value_y2,
            other.welcome_value_y2,
            bounds::WELCOME_VALUE_Y2,
        );
        fill_bounded(
            &mut self.welcome_bonus_points,
            other.welcome_bonus_points,
            bounds::WELCOME_POINTS,
        );
        fill_bounded(&mut self.min_spend, other.min_spend, bounds::MIN_SPEND);
        fill_text(&mut self.subscribe_url, other.subscribe_url.as_deref());
        fill(&mut self.first_year_free, other.first_year_free);
        fill(&mut self.lounge_access, other.lounge_access);
        fill_text(
            &mut self.lounge_access_details,
            other.lounge_access_details.as_deref(),
        );
        fill(
            &mut self.no_foreign_transaction_fee,
            other.no_foreign_transaction_fee,
        );
        fill(&mut self.travel_insurance, other.travel_insurance);
        fill_text(
            &mut self.travel_insurance_details,
            other.travel_insurance_details.as_deref(),
        );
        fill_bounded(
            &mut self.annual_travel_credit,
            other.annual_travel_credit,
            bounds::TRAVEL_CREDIT,
        );
        fill(&mut self.is_business, other.is_business);
        fill(&mut self.no_welcome_bonus, other.no_welcome_bonus);
    }
}

fn fill<T: Copy>(slot: &mut Option<T>, candidate: Option<T>) {
    if slot.is_none() {
        *slot = candidate;
    }
}

fn fill_bounded(slot: &mut Option<u32>, candidate: Option<u32>, bound: Bound) {
    if slot.is_none() {
        *slot = candidate.and_then(|v| bound.accept(v));
    }
}

fn fill_text(slot: &mut Option<String>, candidate: Option<&str>) {
    if slot.is_none() {
        *slot = candidate
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_layer_with_a_value_wins() {
        let embedded = PartialCard {
            annual_cost: Some(0),
            ..PartialCard::default()
        };
        let body = PartialCard {
            annual_cost: Some(139),
            bank: Some(Bank::Td),
            ..PartialCard::default()
        };
        let merged = merge(&[embedded, body]);
        assert_eq!(merged.annual_cost, Some(0));
        assert_eq!(merged.bank, Some(Bank::Td));
    }

    #[test]
    fn out_of_bounds_value_falls_through_to_next_layer() {
        let noisy = PartialCard {
            annual_cost: Some(25_000),
            welcome_value_y2: Some(150_000),
            ..PartialCard::default()
        };
        let fallback = PartialCard {
            annual_cost: Some(120),
            ..PartialCard::default()
        };
        let merged = merge(&[noisy, fallback]);
        assert_eq!(merged.annual_cost, Some(120));
        assert_eq!(merged.welcome_value_y2, None);
    }

    #[test]
    fn blank_strings_are_absent_and_values_are_trimmed() {
        let blank = PartialCard {
            subscribe_url: Some("   ".to_string()),
            ..PartialCard::default()
        };
        let padded = PartialCard {
            subscribe_url: Some("  https://example.com/apply ".to_string()),
            ..PartialCard::default()
        };
        let merged = merge(&[blank, padded]);
        assert_eq!(
            merged.subscribe_url.as_deref(),
            Some("https://example.com/apply")
        );
    }

    #[test]
    fn explicit_false_flag_is_kept() {
        let embedded = PartialCard {
            lounge_access: Some(false),
            ..PartialCard::default()
        };
        let body = PartialCard {
            lounge_access: Some(true),
            ..PartialCard::default()
        };
        assert_eq!(merge(&[embedded, body]).lounge_access, Some(false));
    }

    #[test]
    fn empty_layers_merge_to_empty() {
        assert_eq!(merge(&[]), PartialCard::default());
    }
}
