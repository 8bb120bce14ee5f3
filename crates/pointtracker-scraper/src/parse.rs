//! Card detail page parser.
//!
//! Runs every extractor over one page, merges their partial results in
//! precedence order, then applies the bank-specific program rules and the
//! no-offer override. Parsing is synchronous and never fails: a page that
//! yields nothing still produces a record built from defaults.

use pointtracker_core::{slug_from_url, Bank, CardNetwork, ExtractedCardRecord, PointsType};
use scraper::Html;

use crate::extract::{body_text, bonus, dom, embedded, merge, name, raw_html, slug, PartialCard};
use crate::keywords::{match_map, SCOTIA_POINTS_KEYWORDS};

pub const UNKNOWN_CARD_NAME: &str = "Unknown";

const DEFAULT_NETWORK: CardNetwork = CardNetwork::Visa;
const DEFAULT_BANK: Bank = Bank::Td;
const DEFAULT_POINTS_TYPE: PointsType = PointsType::Aeroplan;

/// A parsed page: the record plus the visible text it was read from, which
/// the AI override consumes.
#[derive(Debug, Clone)]
pub struct ParsedCardPage {
    pub record: ExtractedCardRecord,
    pub body_text: String,
}

/// Views of the document collected before the tree is dropped.
struct DocumentViews {
    card_name: String,
    body: String,
    lines: Vec<String>,
    dom: PartialCard,
    labels: PartialCard,
}

fn document_views(html: &str, url: &str) -> DocumentViews {
    let doc = Html::parse_document(html);
    DocumentViews {
        card_name: dom::card_name(&doc).unwrap_or_else(|| UNKNOWN_CARD_NAME.to_string()),
        body: dom::body_text(&doc),
        lines: dom::text_lines(&doc),
        dom: dom::extract(&doc, url),
        labels: dom::label_values(&doc),
    }
}

/// Parses one card detail page fetched from `url`.
#[must_use]
pub fn parse_card_detail(html: &str, url: &str) -> ParsedCardPage {
    let slug = slug_from_url(url);
    let views = document_views(html, url);
    let offer_lines = bonus::bonus_lines(&views.lines);

    let embedded = embedded::extract(html);
    let merged = merge(&[
        embedded.clone(),
        slug::extract(&slug),
        name::extract(&views.card_name),
        views.dom.clone(),
        raw_html::extract(html),
        views.labels.clone(),
        body_text::extract(&views.card_name, &views.body, &views.lines),
        bonus::extract(&offer_lines),
    ]);

    let bank = merged.bank.unwrap_or(DEFAULT_BANK);
    let points_type = resolve_points_type(
        merged.points_type,
        merged.bank,
        &format!("{} {} {}", views.card_name, views.body, slug.replace('-', " ")),
    );

    let no_welcome_bonus = merged.no_welcome_bonus.unwrap_or(false);
    let welcome_value_y1 = if no_welcome_bonus {
        Some(0)
    } else {
        merged.welcome_value_y1
    };

    let mut bonus_levels = bonus::parse_tiers(&offer_lines);
    if bonus_levels.is_empty() {
        bonus_levels.extend(bonus::fallback_tier(
            embedded.min_spend,
            embedded.welcome_bonus_points,
        ));
    }

    let record = ExtractedCardRecord {
        card_name: views.card_name.trim().to_string(),
        network: merged.network.unwrap_or(DEFAULT_NETWORK),
        bank,
        points_type,
        annual_cost: merged.annual_cost,
        welcome_value_y1,
        welcome_value_y2: merged.welcome_value_y2,
        no_welcome_bonus,
        min_spend: merged.min_spend,
        min_spend_notes: None,
        bonus_details: bonus::bonus_details(&offer_lines),
        bonus_levels,
        subscribe_url: merged.subscribe_url,
        milesopedia_url: Some(url.to_string()),
        milesopedia_slug: Some(slug).filter(|s| !s.is_empty()),
        first_year_free: merged.first_year_free.unwrap_or(false),
        lounge_access: merged.lounge_access.unwrap_or(false),
        lounge_access_details: merged.lounge_access_details,
        no_foreign_transaction_fee: merged.no_foreign_transaction_fee.unwrap_or(false),
        travel_insurance: merged.travel_insurance.unwrap_or(false),
        travel_insurance_details: merged.travel_insurance_details,
        annual_travel_credit: merged.annual_travel_credit,
        is_business: merged.is_business.unwrap_or(false),
    };

    ParsedCardPage {
        record,
        body_text: views.body,
    }
}

/// Scotiabank cards get a second look restricted to Scene and Cashback;
/// banks with a proprietary program default to it when nothing matched.
fn resolve_points_type(found: Option<PointsType>, bank: Option<Bank>, text: &str) -> PointsType {
    let mut points_type = found;

    if bank == Some(Bank::Scotia)
        && !matches!(points_type, Some(PointsType::Scene | PointsType::Cashback))
    {
        if let Some(scotia) = match_map(text, SCOTIA_POINTS_KEYWORDS) {
            points_type = Some(scotia);
        }
    }

    points_type
        .or_else(|| bank.and_then(proprietary_program))
        .unwrap_or(DEFAULT_POINTS_TYPE)
}

fn proprietary_program(bank: Bank) -> Option<PointsType> {
    match bank {
        Bank::Amex => Some(PointsType::AmexPrivileges),
        Bank::Bnc => Some(PointsType::Bnc),
        Bank::Rbc => Some(PointsType::Rbc),
        Bank::Bmo | Bank::Cibc | Bank::Scotia | Bank::Td => None,
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
