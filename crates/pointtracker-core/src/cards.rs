//! Catalog card types shared by the scraper, the store, and the CLI.
//!
//! Enum variants serialize to the exact identifiers the catalog has always
//! used (`"VISA"`, `"Scotia"`, `"Marriott_Bonvoy"`, ...), so the `Display`
//! and `FromStr` impls round-trip through the database text columns.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardNetwork {
    #[serde(rename = "VISA")]
    Visa,
    #[serde(rename = "MASTERCARD")]
    Mastercard,
    #[serde(rename = "AMEX")]
    Amex,
}

impl CardNetwork {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CardNetwork::Visa => "VISA",
            CardNetwork::Mastercard => "MASTERCARD",
            CardNetwork::Amex => "AMEX",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bank {
    #[serde(rename = "AMEX")]
    Amex,
    #[serde(rename = "BMO")]
    Bmo,
    #[serde(rename = "BNC")]
    Bnc,
    #[serde(rename = "CIBC")]
    Cibc,
    #[serde(rename = "RBC")]
    Rbc,
    #[serde(rename = "Scotia")]
    Scotia,
    #[serde(rename = "TD")]
    Td,
}

impl Bank {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Bank::Amex => "AMEX",
            Bank::Bmo => "BMO",
            Bank::Bnc => "BNC",
            Bank::Cibc => "CIBC",
            Bank::Rbc => "RBC",
            Bank::Scotia => "Scotia",
            Bank::Td => "TD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointsType {
    Aeroplan,
    #[serde(rename = "Amex_Privileges")]
    AmexPrivileges,
    #[serde(rename = "BNC")]
    Bnc,
    #[serde(rename = "Marriott_Bonvoy")]
    MarriottBonvoy,
    #[serde(rename = "CIBC")]
    Cibc,
    #[serde(rename = "RBC")]
    Rbc,
    Cashback,
    Scene,
    #[serde(rename = "TD")]
    Td,
    #[serde(rename = "VIP_Porter")]
    VipPorter,
}

impl PointsType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PointsType::Aeroplan => "Aeroplan",
            PointsType::AmexPrivileges => "Amex_Privileges",
            PointsType::Bnc => "BNC",
            PointsType::MarriottBonvoy => "Marriott_Bonvoy",
            PointsType::Cibc => "CIBC",
            PointsType::Rbc => "RBC",
            PointsType::Cashback => "Cashback",
            PointsType::Scene => "Scene",
            PointsType::Td => "TD",
            PointsType::VipPorter => "VIP_Porter",
        }
    }
}

macro_rules! text_enum {
    ($ty:ident, $kind:literal, [$($variant:ident),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                [$($ty::$variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| CoreError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

text_enum!(CardNetwork, "card network", [Visa, Mastercard, Amex]);
text_enum!(Bank, "bank", [Amex, Bmo, Bnc, Cibc, Rbc, Scotia, Td]);
text_enum!(
    PointsType,
    "points type",
    [Aeroplan, AmexPrivileges, Bnc, MarriottBonvoy, Cibc, Rbc, Cashback, Scene, Td, VipPorter]
);

/// One stage of a multi-stage welcome offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusLevel {
    /// 1-based position after chronological sort.
    pub order: u32,
    pub spend_amount: Option<u32>,
    pub months_from_open: Option<u32>,
    pub reward_points: Option<u32>,
}

/// A card detail page discovered in the sitemap. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardListingCandidate {
    pub url: String,
    pub slug: String,
}

impl CardListingCandidate {
    /// Builds a candidate, deriving the slug from the final path segment.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let slug = slug_from_url(&url);
        Self { url, slug }
    }
}

/// Returns the final non-empty path segment of `url`, ignoring any
/// trailing slash, query, or fragment.
#[must_use]
pub fn slug_from_url(url: &str) -> String {
    let without_suffix = url.split(['?', '#']).next().unwrap_or(url);
    without_suffix
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// The normalized record produced for one catalog card page.
///
/// Numeric fields are either `None` or inside their sanity bound; the scraper
/// never clamps an out-of-range value into range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedCardRecord {
    pub card_name: String,
    #[serde(rename = "type")]
    pub network: CardNetwork,
    pub bank: Bank,
    pub points_type: PointsType,
    pub annual_cost: Option<u32>,
    pub welcome_value_y1: Option<u32>,
    pub welcome_value_y2: Option<u32>,
    /// When `true`, `welcome_value_y1` is `Some(0)`: "no offer", not "unknown".
    pub no_welcome_bonus: bool,
    pub min_spend: Option<u32>,
    pub min_spend_notes: Option<String>,
    pub bonus_details: Option<String>,
    pub bonus_levels: Vec<BonusLevel>,
    pub subscribe_url: Option<String>,
    pub milesopedia_url: Option<String>,
    pub milesopedia_slug: Option<String>,
    pub first_year_free: bool,
    pub lounge_access: bool,
    pub lounge_access_details: Option<String>,
    pub no_foreign_transaction_fee: bool,
    pub travel_insurance: bool,
    pub travel_insurance_details: Option<String>,
    pub annual_travel_credit: Option<u32>,
    pub is_business: bool,
}

/// Identity of a card row after an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCard {
    pub id: i64,
    pub slug: String,
}

/// Singleton marker written once per full catalog run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRefreshMarker {
    pub id: String,
    pub completed_at: DateTime<Utc>,
}

impl CatalogRefreshMarker {
    pub const ID: &'static str = "catalog";

    #[must_use]
    pub fn new(completed_at: DateTime<Utc>) -> Self {
        Self {
            id: Self::ID.to_string(),
            completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_from_url_ignores_trailing_slash() {
        assert_eq!(
            slug_from_url("https://milesopedia.com/cartes-de-credit/carte-td-aeroplan/"),
            "carte-td-aeroplan"
        );
    }

    #[test]
    fn slug_from_url_strips_query_and_fragment() {
        assert_eq!(
            slug_from_url("https://milesopedia.com/en/credit-cards/rbc-avion/?ref=x#top"),
            "rbc-avion"
        );
    }

    #[test]
    fn points_type_round_trips_through_text() {
        for value in ["Aeroplan", "Amex_Privileges", "Marriott_Bonvoy", "VIP_Porter", "TD"] {
            let parsed: PointsType = value.parse().unwrap();
            assert_eq!(parsed.to_string(), value);
        }
    }

    #[test]
    fn bank_rejects_unknown_text() {
        let err = "HSBC".parse::<Bank>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownVariant { kind: "bank", .. }));
    }

    #[test]
    fn record_serializes_network_as_type() {
        let record = ExtractedCardRecord {
            card_name: "Carte Visa Infinite Avion RBC".to_string(),
            network: CardNetwork::Visa,
            bank: Bank::Rbc,
            points_type: PointsType::Rbc,
            annual_cost: Some(120),
            welcome_value_y1: None,
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
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "VISA");
        assert_eq!(json["pointsType"], "RBC");
        assert_eq!(json["annualCost"], 120);
    }
}
