//! Extractors over the parsed document tree.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::PartialCard;
use crate::bounds;
use crate::normalize::{
    collapse_whitespace, extract_dollar_value, extract_number, normalize, normalize_spaces,
};

/// Text nodes longer than this are page sections, not labels.
const MAX_LABEL_NODE_CHARS: usize = 200;
/// Amounts read next to a welcome-value label.
const LABEL_VALUE: bounds::Bound = bounds::Bound::new(0, 100_000);

static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static OG_TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="og:title"]"#).expect("valid selector")
});
static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));
static BODY_ELEMENTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body *").expect("valid selector"));
static LINES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li, p").expect("valid selector"));
static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static Y1_BY_ID: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#welcome_offer_year_one").expect("valid selector"));
static Y1_BY_PARTIAL_ID: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[id*="welcome_offer_year"]"#).expect("valid selector")
});
static TEXT_BLACK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".text-black").expect("valid selector"));
static SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span").expect("valid selector"));
static OG_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\|\s*Milesopedia.*$").expect("valid regex"));

const Y1_LABELS: &[&str] = &[
    "valeur de l'offre 1ere annee",
    "valeur de l'offre premiere annee",
    "valeur de la premiere annee",
    "first year value",
    "value of the first year",
];
const Y2_LABELS: &[&str] = &["annee 2 et suivantes", "year 2 and after", "year 2 and beyond"];
const ANNUAL_FEE_LABELS: &[&str] = &["frais annuels", "carte principale", "annual fee"];
const APPLY_LABELS: &[&str] = &["demander", "apply now", "faire une demande"];

/// Card name: first `<h1>`, else `<title>` up to `|`, else `og:title` minus
/// its site suffix.
#[must_use]
pub fn card_name(doc: &Html) -> Option<String> {
    let h1 = doc
        .select(&H1)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty());
    if h1.is_some() {
        return h1;
    }

    let title = doc
        .select(&TITLE)
        .next()
        .map(element_text)
        .and_then(|t| t.split('|').next().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty());
    if title.is_some() {
        return title;
    }

    doc.select(&OG_TITLE)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| OG_SUFFIX_RE.replace(content, "").trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Visible body text, with `<script>` and `<style>` content left out.
#[must_use]
pub fn body_text(doc: &Html) -> String {
    let root = doc.select(&BODY).next().unwrap_or_else(|| doc.root_element());
    let mut out = String::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element())
            .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript"));
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    collapse_whitespace(&normalize_spaces(&out))
}

/// Trimmed text of every `<li>` and `<p>`, in document order.
#[must_use]
pub fn text_lines(doc: &Html) -> Vec<String> {
    doc.select(&LINES)
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Welcome-offer cell values, the annual-fee label scan, and the apply link.
#[must_use]
pub fn extract(doc: &Html, page_url: &str) -> PartialCard {
    let (welcome_value_y1, welcome_value_y2) = welcome_container_values(doc);

    PartialCard {
        annual_cost: annual_fee_from_labels(doc),
        welcome_value_y1,
        welcome_value_y2,
        subscribe_url: apply_link(doc, page_url),
        ..PartialCard::default()
    }
}

/// Welcome values read next to their text labels. Ranks below the raw-source
/// cell fallback.
#[must_use]
pub fn label_values(doc: &Html) -> PartialCard {
    let (welcome_value_y1, welcome_value_y2) = welcome_label_values(doc);
    PartialCard {
        welcome_value_y1,
        welcome_value_y2,
        ..PartialCard::default()
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&normalize_spaces(&el.text().collect::<Vec<_>>().join(" ")))
}

/// Text of a welcome-offer cell: `.text-black`, else the first `<span>`, else
/// the element's own text.
fn offer_cell_text(el: ElementRef<'_>) -> String {
    [&*TEXT_BLACK, &*SPAN]
        .iter()
        .find_map(|sel| {
            el.select(sel)
                .next()
                .map(element_text)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| element_text(el))
}

fn amount_in(text: &str, bound: bounds::Bound) -> Option<u32> {
    extract_dollar_value(text)
        .or_else(|| extract_number(text))
        .and_then(|n| bound.accept(n))
}

/// Y1 from the `welcome_offer_year_one` cell; Y2 from its next sibling.
fn welcome_container_values(doc: &Html) -> (Option<u32>, Option<u32>) {
    let Some(y1_el) = doc
        .select(&Y1_BY_ID)
        .next()
        .or_else(|| doc.select(&Y1_BY_PARTIAL_ID).next())
    else {
        return (None, None);
    };

    let y1 = amount_in(&offer_cell_text(y1_el), bounds::WELCOME_VALUE_Y1);

    let y2 = y1_el
        .next_siblings()
        .find_map(ElementRef::wrap)
        .and_then(|sibling| amount_in(&offer_cell_text(sibling), bounds::WELCOME_VALUE_Y2))
        .filter(|n| *n != 2);

    (y1, y2)
}

/// Scans short nodes for "first year value" and "year 2 and after" labels.
/// The amount is read after the label, or from the next sibling element.
fn welcome_label_values(doc: &Html) -> (Option<u32>, Option<u32>) {
    let mut y1 = None;
    let mut y2 = None;

    for el in doc.select(&BODY_ELEMENTS) {
        if y1.is_some() && y2.is_some() {
            break;
        }
        let raw = element_text(el);
        if raw.is_empty() || raw.chars().count() > MAX_LABEL_NODE_CHARS {
            continue;
        }
        let norm = normalize(&raw);

        if y1.is_none() {
            if let Some(rest) = after_label(&norm, Y1_LABELS) {
                y1 = amount_in(rest, LABEL_VALUE).or_else(|| {
                    el.next_siblings()
                        .find_map(ElementRef::wrap)
                        .and_then(|next| amount_in(&element_text(next), LABEL_VALUE))
                });
            }
        }

        if y2.is_none() {
            if let Some(rest) = after_label(&norm, Y2_LABELS) {
                y2 = extract_number(rest)
                    .filter(|n| *n != 2)
                    .and_then(|n| LABEL_VALUE.accept(n));
            }
        }
    }

    (y1, y2)
}

fn after_label<'a>(norm: &'a str, labels: &[&str]) -> Option<&'a str> {
    labels
        .iter()
        .find_map(|label| norm.find(label).map(|idx| &norm[idx + label.len()..]))
}

/// Short nodes (10 to 80 chars) mentioning the annual fee. The last match in
/// document order wins.
fn annual_fee_from_labels(doc: &Html) -> Option<u32> {
    doc.select(&BODY_ELEMENTS)
        .filter_map(|el| {
            let raw = element_text(el);
            let len = raw.chars().count();
            if !(11..80).contains(&len) {
                return None;
            }
            let norm = normalize(&raw);
            if !ANNUAL_FEE_LABELS.iter().any(|label| norm.contains(label)) {
                return None;
            }
            extract_number(&raw).and_then(|n| bounds::ANNUAL_COST.accept(n))
        })
        .last()
}

/// First anchor whose text reads like an apply button, resolved against the
/// page URL.
fn apply_link(doc: &Html, page_url: &str) -> Option<String> {
    let base = reqwest::Url::parse(page_url).ok();
    doc.select(&ANCHORS).find_map(|a| {
        let label = normalize(&element_text(a));
        if !APPLY_LABELS.iter().any(|l| label.contains(l)) {
            return None;
        }
        let href = a.value().attr("href")?.trim();
        if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
            return None;
        }
        match &base {
            Some(base) => base.join(href).ok().map(|u| u.to_string()),
            None => Some(href.to_string()),
        }
    })
}
