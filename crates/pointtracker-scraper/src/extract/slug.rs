//! Fields implied by the card's URL slug.

use pointtracker_core::CardNetwork;

use super::PartialCard;
use crate::keywords::{bank_from_slug, points_type_from_slug};
use crate::normalize::normalize;

#[must_use]
pub fn extract(slug: &str) -> PartialCard {
    let slug_norm = normalize(slug);
    let spaced = slug_norm.replace('-', " ");

    PartialCard {
        network: network_from_words(&spaced),
        bank: bank_from_slug(&slug_norm),
        points_type: points_type_from_slug(&slug_norm),
        is_business: is_business_slug(&spaced).then_some(true),
        ..PartialCard::default()
    }
}

/// AMEX and Mastercard are checked before Visa; a standalone `mc` token
/// means Mastercard.
fn network_from_words(spaced: &str) -> Option<CardNetwork> {
    let has_token = |token: &str| spaced.split(' ').any(|w| w == token);

    if spaced.contains("american express") || spaced.contains("amex") {
        Some(CardNetwork::Amex)
    } else if spaced.contains("mastercard") || spaced.contains("master card") || has_token("mc")
    {
        Some(CardNetwork::Mastercard)
    } else if spaced.contains("visa") {
        Some(CardNetwork::Visa)
    } else {
        None
    }
}

fn is_business_slug(spaced: &str) -> bool {
    spaced
        .split(' ')
        .any(|w| matches!(w, "affaires" | "business" | "entreprise" | "entreprises"))
}
