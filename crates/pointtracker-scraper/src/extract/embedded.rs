//! Scanner for the JSON fragments the catalog site embeds server-side.
//!
//! These values do not depend on client-side rendering, which makes this the
//! most authoritative layer when a key is present.

use std::sync::LazyLock;

use pointtracker_core::{CardNetwork, PointsType};
use regex::Regex;

use super::PartialCard;
use crate::normalize::{normalize, parse_grouped};

/// How far past `"main"` to look for its `"value"` key.
const MAIN_VALUE_WINDOW: usize = 800;

static ANNUAL_FEE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""annual_fee"\s*:\s*"(\d+)""#).expect("valid regex"));
static MIN_SPEND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"minimum_spending[^0-9]*(\d[\d \u{a0},]*)").expect("valid regex")
});
static WELCOME_POINTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""mc_welcome_bonus_amount"\s*:\s*"(\d+)""#).expect("valid regex")
});
static MAIN_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""value"\s*:\s*"(\d+)""#).expect("valid regex"));
static PROGRAM_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["rewards_program", "points_program", "program", "reward_program"]
        .iter()
        .map(|key| key_string_regex(key))
        .collect()
});
static NETWORK_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        "card_network",
        "payment_network",
        "network",
        "card_type",
        "cardType",
    ]
    .iter()
    .map(|key| key_string_regex(key))
    .collect()
});
static SUBSCRIBE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:apply_url|subscribe_url)"\s*:\s*"([^"]+)""#).expect("valid regex")
});
static LOUNGE_RE: LazyLock<Regex> =
    LazyLock::new(|| flag_regex("lounge_access|vip_lounge|airport_lounge"));
static FIRST_YEAR_FREE_RE: LazyLock<Regex> = LazyLock::new(|| {
    flag_regex("first_year_free|first_year_fee_waived|annual_fee_waived_first_year")
});
static NO_WELCOME_RE: LazyLock<Regex> =
    LazyLock::new(|| flag_regex("no_welcome_bonus|no_welcome_offer"));
static TRAVEL_CREDIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:annual_travel_credit|travel_credit)"\s*:\s*"?(\d+)"#).expect("valid regex")
});

fn key_string_regex(key: &str) -> Regex {
    Regex::new(&format!(r#""{key}"\s*:\s*"([^"]+)""#)).expect("valid regex")
}

fn flag_regex(keys: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)"(?:{keys})"\s*:\s*"?(true|false|yes|no|1|0)"?"#
    ))
    .expect("valid regex")
}

/// Extracts every embedded field present in the raw page source.
#[must_use]
pub fn extract(html: &str) -> PartialCard {
    PartialCard {
        network: network(html),
        points_type: points_type(html),
        annual_cost: capture_u32(&ANNUAL_FEE_RE, html),
        welcome_value_y1: main_value(html),
        welcome_bonus_points: capture_u32(&WELCOME_POINTS_RE, html).filter(|n| *n > 0),
        min_spend: MIN_SPEND_RE
            .captures(html)
            .and_then(|c| parse_grouped(&c[1]))
            .filter(|n| *n >= 100),
        subscribe_url: SUBSCRIBE_URL_RE
            .captures(html)
            .map(|c| c[1].replace("\\/", "/")),
        first_year_free: flag(&FIRST_YEAR_FREE_RE, html),
        lounge_access: flag(&LOUNGE_RE, html),
        annual_travel_credit: capture_u32(&TRAVEL_CREDIT_RE, html),
        no_welcome_bonus: flag(&NO_WELCOME_RE, html),
        ..PartialCard::default()
    }
}

fn capture_u32(re: &Regex, html: &str) -> Option<u32> {
    re.captures(html).and_then(|c| c[1].parse::<u32>().ok())
}

fn flag(re: &Regex, html: &str) -> Option<bool> {
    let caps = re.captures(html)?;
    Some(matches!(
        caps[1].to_ascii_lowercase().as_str(),
        "true" | "yes" | "1"
    ))
}

/// First-year dollar value from the `"main": { "value": "400" }` block.
fn main_value(html: &str) -> Option<u32> {
    let start = html.find("\"main\"")?;
    let tail = &html[start..];
    let end = tail
        .char_indices()
        .nth(MAIN_VALUE_WINDOW)
        .map_or(tail.len(), |(idx, _)| idx);
    capture_u32(&MAIN_VALUE_RE, &tail[..end]).filter(|n| *n < 100_000)
}

fn points_type(html: &str) -> Option<PointsType> {
    PROGRAM_RES.iter().find_map(|re| {
        let raw = re.captures(html)?;
        program_from_text(&normalize(&raw[1]))
    })
}

fn program_from_text(v: &str) -> Option<PointsType> {
    let has = |needle: &str| v.contains(needle);
    if has("aeroplan") || has("privilege") {
        Some(PointsType::Aeroplan)
    } else if has("avion") {
        Some(PointsType::Rbc)
    } else if has("aventura") {
        Some(PointsType::Cibc)
    } else if has("bonvoy") || has("marriott") {
        Some(PointsType::MarriottBonvoy)
    } else if has("scene") {
        Some(PointsType::Scene)
    } else if has("cashback") || has("remise") {
        Some(PointsType::Cashback)
    } else if has("vip") && has("porter") {
        Some(PointsType::VipPorter)
    } else if has("bnc") {
        Some(PointsType::Bnc)
    } else if has("td") {
        Some(PointsType::Td)
    } else {
        None
    }
}

fn network(html: &str) -> Option<CardNetwork> {
    NETWORK_RES.iter().find_map(|re| {
        let raw = re.captures(html)?;
        let v = normalize(&raw[1]);
        if v.contains("amex") || v.contains("american") {
            Some(CardNetwork::Amex)
        } else if v.contains("master") {
            Some(CardNetwork::Mastercard)
        } else if v.contains("visa") {
            Some(CardNetwork::Visa)
        } else {
            None
        }
    })
}
