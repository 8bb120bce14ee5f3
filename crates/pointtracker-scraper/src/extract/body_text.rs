//! Lowest-precedence catch-all: regexes over the page's full visible text.

use std::sync::LazyLock;

use regex::Regex;

use super::{features, PartialCard};
use crate::keywords::{match_map, BANK_KEYWORDS, NETWORK_KEYWORDS, POINTS_TYPE_KEYWORDS};
use crate::normalize::{normalize, normalize_spaces, parse_grouped};

const NUM: &str = r"(\d{1,3}(?:[ ,]\d{3})+|\d+)";

static ANNUAL_FEE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"(?i)frais\s+annuels\s*:?\s*{NUM}"),
        format!(r"(?i)annual\s+fee\s*:?\s*\$?\s*{NUM}"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static MIN_SPEND_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"(?i)achats?\s+minimums?\s+requis\s*:?\s*{NUM}"),
        format!(r#"(?i)minimum\s+spend(?:ing)?["\s:]+\$?\s*{NUM}"#),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static WELCOME_VALUE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"(?i)valeur\s+pouvant\s+aller\s+jusqu['\u{{2019}}]?\s*[àa]\s+{NUM}\s*\$?"),
        format!(r"(?i)jusqu['\u{{2019}}]?\s*[àa]\s+{NUM}\s*\$?\s*†"),
        r"(\d[\d ]{2,6})\s*\$?\s*†[^0-9]*\)\s*:".to_string(),
        format!(r"(?i)(?:worth|value\s+of)\s+up\s+to\s+\$\s*{NUM}"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Welcome dollar amounts under this are point counts or footnote numbers.
const MIN_WELCOME_DOLLARS: u32 = 100;

/// Reads the page name plus body text. `lines` are the `<li>`/`<p>` texts
/// used for detail snippets.
#[must_use]
pub fn extract(card_name: &str, body: &str, lines: &[String]) -> PartialCard {
    let body = normalize_spaces(body);
    let combined = format!("{card_name} {body}");
    let norm = normalize(&combined);

    PartialCard {
        network: match_map(&combined, NETWORK_KEYWORDS),
        bank: match_map(&combined, BANK_KEYWORDS),
        points_type: match_map(&combined, POINTS_TYPE_KEYWORDS),
        annual_cost: first_capture(&ANNUAL_FEE_RES, &body),
        welcome_value_y1: first_capture(&WELCOME_VALUE_RES, &body)
            .filter(|n| *n >= MIN_WELCOME_DOLLARS),
        min_spend: first_capture(&MIN_SPEND_RES, &body).filter(|n| *n > 0),
        first_year_free: features::first_year_free(&norm).then_some(true),
        lounge_access: features::lounge_access(&norm).then_some(true),
        lounge_access_details: features::lounge_access_details(lines),
        no_foreign_transaction_fee: features::no_foreign_transaction_fee(&norm).then_some(true),
        travel_insurance: features::travel_insurance(&norm).then_some(true),
        travel_insurance_details: features::travel_insurance_details(lines),
        annual_travel_credit: features::annual_travel_credit(&norm),
        no_welcome_bonus: features::no_welcome_bonus(&norm).then_some(true),
        ..PartialCard::default()
    }
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<u32> {
    patterns
        .iter()
        .find_map(|re| re.captures(text).and_then(|c| parse_grouped(&c[1])))
}

#[cfg(test)]
mod tests {
    use pointtracker_core::{Bank, CardNetwork, PointsType};

    use super::*;

    #[test]
    fn reads_french_fee_and_minimum_spend() {
        let body = "Frais annuels 139 $ Achats minimum requis 1\u{a0}500 $";
        let card = extract("Carte TD Aéroplan Visa Infinite", body, &[]);
        assert_eq!(card.annual_cost, Some(139));
        assert_eq!(card.min_spend, Some(1_500));
        assert_eq!(card.bank, Some(Bank::Td));
        assert_eq!(card.network, Some(CardNetwork::Visa));
        assert_eq!(card.points_type, Some(PointsType::Aeroplan));
    }

    #[test]
    fn reads_english_fee() {
        let card = extract("RBC Avion", "Annual fee: $120 per year", &[]);
        assert_eq!(card.annual_cost, Some(120));
        assert_eq!(card.points_type, Some(PointsType::Rbc));
    }

    #[test]
    fn reads_welcome_value_phrasings() {
        let fr = extract("", "une valeur pouvant aller jusqu’à 1 500 $", &[]);
        assert_eq!(fr.welcome_value_y1, Some(1_500));

        let footnote = extract("", "Obtenez jusqu'à 900 $ † en récompenses", &[]);
        assert_eq!(footnote.welcome_value_y1, Some(900));

        let en = extract("", "a welcome offer worth up to $1,200", &[]);
        assert_eq!(en.welcome_value_y1, Some(1_200));
    }

    #[test]
    fn small_welcome_amounts_are_ignored() {
        let card = extract("", "valeur pouvant aller jusqu'à 12 $", &[]);
        assert_eq!(card.welcome_value_y1, None);
    }

    #[test]
    fn features_are_only_set_when_detected() {
        let card = extract("", "Accès aux salons Priority Pass et assurance voyage", &[]);
        assert_eq!(card.lounge_access, Some(true));
        assert_eq!(card.travel_insurance, Some(true));
        assert_eq!(card.first_year_free, None);
        assert_eq!(card.no_welcome_bonus, None);
    }
}
