//! Ordered keyword tables.
//!
//! Order is load-bearing: the first keyword contained in the text wins, so
//! specific phrases (`"rbc avion"`) sit above the generic ones (`"avion"`)
//! they would otherwise be shadowed by. Keep these as slices.

use pointtracker_core::{Bank, CardNetwork, PointsType};

use crate::normalize::normalize;

pub const BANK_KEYWORDS: &[(&str, Bank)] = &[
    ("american express", Bank::Amex),
    ("amex", Bank::Amex),
    ("banque nationale", Bank::Bnc),
    ("bnc", Bank::Bnc),
    ("bmo", Bank::Bmo),
    ("cibc", Bank::Cibc),
    ("rbc", Bank::Rbc),
    ("banque royale", Bank::Rbc),
    ("scotia", Bank::Scotia),
    ("banque scotia", Bank::Scotia),
    ("td", Bank::Td),
];

pub const POINTS_TYPE_KEYWORDS: &[(&str, PointsType)] = &[
    ("points privilèges", PointsType::Aeroplan),
    ("points-privileges", PointsType::Aeroplan),
    ("aéroplan", PointsType::Aeroplan),
    ("aeroplan", PointsType::Aeroplan),
    ("bnc récompenses", PointsType::Bnc),
    ("récompenses bnc", PointsType::Bnc),
    ("marriott bonvoy", PointsType::MarriottBonvoy),
    ("bonvoy", PointsType::MarriottBonvoy),
    ("marriott", PointsType::MarriottBonvoy),
    ("cibc aventura", PointsType::Cibc),
    ("aventura", PointsType::Cibc),
    ("rbc avion", PointsType::Rbc),
    ("avion", PointsType::Rbc),
    ("viporter", PointsType::VipPorter),
    ("vip porter", PointsType::VipPorter),
    ("scotia scene", PointsType::Scene),
    ("scotia scène", PointsType::Scene),
    ("carte scène", PointsType::Scene),
    ("carte scene", PointsType::Scene),
    ("points scène", PointsType::Scene),
    ("points scene", PointsType::Scene),
    ("scène scotia", PointsType::Scene),
    ("scene scotia", PointsType::Scene),
    ("scène", PointsType::Scene),
    ("scene", PointsType::Scene),
    ("scotia cashback", PointsType::Cashback),
    ("carte cashback", PointsType::Cashback),
    ("remise en argent", PointsType::Cashback),
    ("remise", PointsType::Cashback),
    ("cashback", PointsType::Cashback),
    ("primes td", PointsType::Td),
    ("td rewards", PointsType::Td),
    ("rewards td", PointsType::Td),
    ("bnc", PointsType::Bnc),
    ("td", PointsType::Td),
];

/// Scotiabank cards are nearly always Scene or Cashback.
pub const SCOTIA_POINTS_KEYWORDS: &[(&str, PointsType)] = &[
    ("scotia scene", PointsType::Scene),
    ("scotia scène", PointsType::Scene),
    ("carte scène", PointsType::Scene),
    ("points scène", PointsType::Scene),
    ("scène", PointsType::Scene),
    ("scene", PointsType::Scene),
    ("scotia cashback", PointsType::Cashback),
    ("carte cashback", PointsType::Cashback),
    ("remise en argent", PointsType::Cashback),
    ("remise", PointsType::Cashback),
    ("cashback", PointsType::Cashback),
];

pub const NETWORK_KEYWORDS: &[(&str, CardNetwork)] = &[
    ("american express", CardNetwork::Amex),
    ("amex", CardNetwork::Amex),
    ("mastercard", CardNetwork::Mastercard),
    ("master card", CardNetwork::Mastercard),
    ("master-card", CardNetwork::Mastercard),
    ("visa", CardNetwork::Visa),
];

/// Returns the value of the first pair whose normalized keyword occurs in the
/// normalized `text`.
#[must_use]
pub fn match_map<T: Copy>(text: &str, pairs: &[(&str, T)]) -> Option<T> {
    let haystack = normalize(text);
    match_normalized(&haystack, pairs)
}

/// Like [`match_map`] for text that is already normalized.
pub(crate) fn match_normalized<T: Copy>(haystack: &str, pairs: &[(&str, T)]) -> Option<T> {
    pairs.iter().find_map(|&(keyword, value)| {
        let keyword = normalize(keyword);
        (!keyword.is_empty() && haystack.contains(&keyword)).then_some(value)
    })
}

/// Points program implied by a normalized, hyphenated URL slug.
#[must_use]
pub fn points_type_from_slug(slug: &str) -> Option<PointsType> {
    let s = slug.to_lowercase();
    let has = |needle: &str| s.contains(needle);

    if has("aeroplan") {
        Some(PointsType::Aeroplan)
    } else if has("avion") {
        Some(PointsType::Rbc)
    } else if has("aventura") {
        Some(PointsType::Cibc)
    } else if has("bonvoy") || has("marriott") {
        Some(PointsType::MarriottBonvoy)
    } else if has("scene") {
        Some(PointsType::Scene)
    } else if has("cashback") {
        Some(PointsType::Cashback)
    } else if has("viporter") || has("vip-porter") {
        Some(PointsType::VipPorter)
    } else if has("privilege") {
        Some(PointsType::Aeroplan)
    } else if has("bnc") {
        Some(PointsType::Bnc)
    } else if has("td") {
        Some(PointsType::Td)
    } else {
        None
    }
}

/// Bank named in a normalized, hyphenated URL slug. Multi-word keywords are
/// matched in their hyphenated form.
#[must_use]
pub fn bank_from_slug(slug: &str) -> Option<Bank> {
    let s = slug.to_lowercase();
    BANK_KEYWORDS
        .iter()
        .find(|(keyword, _)| s.contains(&keyword.replace(' ', "-")))
        .map(|&(_, bank)| bank)
}
