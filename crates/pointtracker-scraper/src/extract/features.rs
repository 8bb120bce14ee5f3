//! Bilingual keyword detectors for card perks and the no-offer flag.
//!
//! Flags are read from normalized body text. Details come from the first
//! `<li>`/`<p>` line that mentions the perk, kept in its original wording.

use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::{normalize, parse_grouped};

const MAX_DETAILS_CHARS: usize = 300;

const LOUNGE_PHRASES: &[&str] = &[
    "acces aux salons",
    "salons d'aeroport",
    "salon d'aeroport",
    "salons vip",
    "airport lounge",
    "lounge access",
    "priority pass",
    "dragonpass",
    "plaza premium",
    "salons feuille d'erable",
    "maple leaf lounge",
];

const FIRST_YEAR_FREE_PHRASES: &[&str] = &[
    "premiere annee gratuite",
    "gratuite la premiere annee",
    "frais annuels annules la premiere annee",
    "frais annuels rembourses la premiere annee",
    "remise des frais annuels la premiere annee",
    "aucuns frais annuels la premiere annee",
    "first year free",
    "annual fee waived for the first year",
    "first-year annual fee waived",
    "first year annual fee waived",
    "annual fee rebate for the first year",
];

const NO_FX_PHRASES: &[&str] = &[
    "aucuns frais de transaction en devises",
    "aucuns frais de change",
    "aucun frais de change",
    "sans frais de change",
    "sans frais de conversion",
    "aucuns frais de conversion",
    "aucun frais de conversion",
    "no foreign transaction fee",
    "no foreign exchange fee",
    "no fx fee",
];

const TRAVEL_INSURANCE_PHRASES: &[&str] = &[
    "assurance voyage",
    "assurance-voyage",
    "assurance medicale de voyage",
    "assurance annulation de voyage",
    "travel insurance",
    "travel medical insurance",
    "trip cancellation insurance",
];

const NO_WELCOME_PHRASES: &[&str] = &[
    "aucune offre de bienvenue",
    "aucune prime de bienvenue",
    "pas d'offre de bienvenue",
    "pas de prime de bienvenue",
    "no welcome offer",
    "no welcome bonus",
    "no sign-up bonus",
];

const NUM: &str = r"(\d{1,3}(?:[ ,]\d{3})+|\d+)";

static TRAVEL_CREDIT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"credits? (?:de )?voyage (?:annuels? )?(?:de |d'une valeur de )?{NUM} ?\$"),
        format!(r"{NUM} ?\$ (?:de |en )?credits? (?:de )?voyage"),
        format!(r"\$ ?{NUM} (?:annual )?travel credit"),
        format!(r"annual travel credit (?:of )?(?:up to )?\$ ?{NUM}"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// `true` when any phrase occurs in the normalized text.
fn mentions(norm: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| norm.contains(p))
}

/// First line mentioning any phrase, truncated.
fn details(lines: &[String], phrases: &[&str]) -> Option<String> {
    lines
        .iter()
        .find(|line| mentions(&normalize(line), phrases))
        .map(|line| line.chars().take(MAX_DETAILS_CHARS).collect::<String>().trim().to_string())
}

#[must_use]
pub fn lounge_access(norm: &str) -> bool {
    mentions(norm, LOUNGE_PHRASES)
}

#[must_use]
pub fn lounge_access_details(lines: &[String]) -> Option<String> {
    details(lines, LOUNGE_PHRASES)
}

#[must_use]
pub fn first_year_free(norm: &str) -> bool {
    mentions(norm, FIRST_YEAR_FREE_PHRASES)
}

#[must_use]
pub fn no_foreign_transaction_fee(norm: &str) -> bool {
    mentions(norm, NO_FX_PHRASES)
}

#[must_use]
pub fn travel_insurance(norm: &str) -> bool {
    mentions(norm, TRAVEL_INSURANCE_PHRASES)
}

#[must_use]
pub fn travel_insurance_details(lines: &[String]) -> Option<String> {
    details(lines, TRAVEL_INSURANCE_PHRASES)
}

#[must_use]
pub fn no_welcome_bonus(norm: &str) -> bool {
    mentions(norm, NO_WELCOME_PHRASES)
}

/// Dollar amount of an annual travel credit, unbounded.
#[must_use]
pub fn annual_travel_credit(norm: &str) -> Option<u32> {
    TRAVEL_CREDIT_RES
        .iter()
        .find_map(|re| re.captures(norm).and_then(|c| parse_grouped(&c[1])))
}

/// Business cards name themselves in the card name.
#[must_use]
pub fn is_business_name(norm_name: &str) -> bool {
    norm_name.contains("affaires")
        || norm_name.contains("business")
        || norm_name.contains("entreprise")
}
