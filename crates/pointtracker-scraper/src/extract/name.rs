//! Fields read from the card name alone, before body text is consulted.

use super::{features, PartialCard};
use crate::keywords::{match_normalized, BANK_KEYWORDS, NETWORK_KEYWORDS, POINTS_TYPE_KEYWORDS};
use crate::normalize::normalize;

#[must_use]
pub fn extract(card_name: &str) -> PartialCard {
    let norm = normalize(card_name);
    PartialCard {
        network: match_normalized(&norm, NETWORK_KEYWORDS),
        bank: match_normalized(&norm, BANK_KEYWORDS),
        points_type: match_normalized(&norm, POINTS_TYPE_KEYWORDS),
        is_business: features::is_business_name(&norm).then_some(true),
        ..PartialCard::default()
    }
}
