//! Welcome-bonus lines: offer text, tiered thresholds, and the minimum spend
//! quoted next to them.

use std::sync::LazyLock;

use pointtracker_core::BonusLevel;
use regex::{Captures, Regex};

use super::PartialCard;
use crate::bounds;
use crate::normalize::{normalize, parse_grouped};

/// Months assumed when an offer is phrased as "in the first year".
pub const FIRST_YEAR_MONTHS: u32 = 12;

const CONTAINS_TRIGGERS: &[&str] = &[
    "prime de bienvenue",
    "offre de bienvenue",
    "welcome bonus",
    "welcome offer",
];
const PREFIX_TRIGGERS: &[&str] = &[
    "obtenez ",
    "obtenez jusqu",
    "les nouveaux",
    "les nouvelles",
    "earn ",
    "new cardholders",
];

const NUM: &str = r"\d{1,3}(?:[ ,]\d{3})+|\d+";

/// Points amount, optionally followed by up to three program words.
fn points_prefix() -> String {
    format!(r"(?P<points>{NUM})\s+(?:[a-z+'-]+\s+){{0,3}}?points?\b[^.;]*?")
}

fn spend_dollars() -> String {
    format!(r"(?:\$\s*(?P<spend>{NUM})|(?P<spend_suffix>{NUM})\s*\$)")
}

static EN_MONTHS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{}{}[^.;]*?\b(?:in|within)\s+(?:the\s+)?(?:first\s+)?(?P<months>\d{{1,2}})\s+months?",
        points_prefix(),
        spend_dollars()
    ))
    .expect("valid regex")
});
static EN_FIRST_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{}{}[^.;]*?\b(?:in|within|during)\s+(?:the\s+|your\s+)?first\s+year",
        points_prefix(),
        spend_dollars()
    ))
    .expect("valid regex")
});
static FR_MONTHS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{}{}[^.;]*?(?P<months>\d{{1,2}})\s+(?:premiers\s+)?mois",
        points_prefix(),
        spend_dollars()
    ))
    .expect("valid regex")
});
static FR_FIRST_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{}{}[^.;]*?(?:premiere|1re|1ere)\s+annee",
        points_prefix(),
        spend_dollars()
    ))
    .expect("valid regex")
});
static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Whether a line reads like welcome-offer copy.
#[must_use]
pub fn is_bonus_line(norm: &str) -> bool {
    CONTAINS_TRIGGERS.iter().any(|t| norm.contains(t))
        || PREFIX_TRIGGERS.iter().any(|t| norm.starts_with(t))
}

/// Bonus lines in document order, exact duplicates dropped.
#[must_use]
pub fn bonus_lines(lines: &[String]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for line in lines {
        if is_bonus_line(&normalize(line)) && !out.contains(&line.as_str()) {
            out.push(line);
        }
    }
    out
}

/// Minimum spend from bonus lines: the smallest dollar figure in
/// `[1_000, 1_000_000)` on a line quoting a `$` amount.
#[must_use]
pub fn min_spend_from_lines(lines: &[&str]) -> Option<u32> {
    lines
        .iter()
        .filter(|line| line.contains('$'))
        .flat_map(|line| {
            let compact: String = line
                .chars()
                .filter(|c| !c.is_whitespace() && *c != ',')
                .collect();
            DIGIT_RUN_RE
                .find_iter(&compact)
                .filter_map(|m| m.as_str().parse::<u32>().ok())
                .filter(|n| bounds::BONUS_LINE_SPEND.contains(*n))
                .collect::<Vec<_>>()
        })
        .min()
}

#[must_use]
pub fn extract(lines: &[&str]) -> PartialCard {
    PartialCard {
        min_spend: min_spend_from_lines(lines),
        ..PartialCard::default()
    }
}

/// Joined offer text, `None` when the page has no bonus lines.
#[must_use]
pub fn bonus_details(lines: &[&str]) -> Option<String> {
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Tier triples from bonus lines, sorted by month offset and numbered from 1.
#[must_use]
pub fn parse_tiers(lines: &[&str]) -> Vec<BonusLevel> {
    let mut triples: Vec<(u32, u32, u32)> = Vec::new();

    for line in lines {
        let norm = normalize(line);
        let patterns: [(&Regex, Option<u32>); 4] = [
            (&*EN_MONTHS_RE, None),
            (&*EN_FIRST_YEAR_RE, Some(FIRST_YEAR_MONTHS)),
            (&*FR_MONTHS_RE, None),
            (&*FR_FIRST_YEAR_RE, Some(FIRST_YEAR_MONTHS)),
        ];
        for (re, fixed_months) in patterns {
            for caps in re.captures_iter(&norm) {
                if let Some(triple) = tier_triple(&caps, fixed_months) {
                    if !triples.contains(&triple) {
                        triples.push(triple);
                    }
                }
            }
        }
    }

    triples.sort_by_key(|&(_, _, months)| months);
    triples
        .into_iter()
        .zip(1u32..)
        .map(|((points, spend, months), order)| BonusLevel {
            order,
            spend_amount: Some(spend),
            months_from_open: Some(months),
            reward_points: Some(points),
        })
        .collect()
}

fn tier_triple(caps: &Captures<'_>, fixed_months: Option<u32>) -> Option<(u32, u32, u32)> {
    let points = caps
        .name("points")
        .and_then(|m| parse_grouped(m.as_str()))
        .and_then(|n| bounds::TIER_POINTS.accept(n))?;
    let spend = caps
        .name("spend")
        .or_else(|| caps.name("spend_suffix"))
        .and_then(|m| parse_grouped(m.as_str()))
        .and_then(|n| bounds::TIER_SPEND.accept(n))?;
    let months = match fixed_months {
        Some(months) => months,
        None => caps
            .name("months")
            .and_then(|m| m.as_str().parse::<u32>().ok())?,
    };
    let months = bounds::TIER_MONTHS.accept(months)?;
    Some((points, spend, months))
}

/// Single tier synthesized from embedded spend and point count.
#[must_use]
pub fn fallback_tier(min_spend: Option<u32>, welcome_points: Option<u32>) -> Option<BonusLevel> {
    let spend = min_spend.and_then(|n| bounds::TIER_SPEND.accept(n))?;
    let points = welcome_points.and_then(|n| bounds::TIER_POINTS.accept(n))?;
    Some(BonusLevel {
        order: 1,
        spend_amount: Some(spend),
        months_from_open: Some(FIRST_YEAR_MONTHS),
        reward_points: Some(points),
    })
}
