//! Text and value normalizers shared by every field extractor.
//!
//! Keyword matching always happens on [`normalize`]d text. Currency parsing
//! always runs after [`normalize_spaces`], since the catalog writes amounts
//! the French way (`1 500 $`) with non-breaking spaces.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::bounds;

const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

static DOLLAR_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d\s,]*)\s*\$").expect("valid regex"));
static LOOSE_DOLLAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\$?").expect("valid regex"));
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));
static NBSP_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)&nbsp;").expect("valid regex"));

/// Lowercases, strips diacritics, folds typographic apostrophes, collapses
/// whitespace, and trims.
#[must_use]
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .map(|c| if c == '\u{2019}' { '\'' } else { c })
        .collect();
    collapse_whitespace(&folded)
}

/// Replaces non-breaking spaces (`U+00A0`, `U+202F`) and `&nbsp;` entities
/// with a plain space.
#[must_use]
pub fn normalize_spaces(text: &str) -> String {
    let replaced = text.replace(['\u{00a0}', '\u{202f}'], " ");
    NBSP_ENTITY_RE.replace_all(&replaced, " ").into_owned()
}

#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts a dollar amount, preferring digits immediately followed by `$`.
///
/// Falls back to the first digit run once whitespace and thousands commas are
/// removed. Either way, values outside `[0, 1_000_000)` yield `None`.
#[must_use]
pub fn extract_dollar_value(text: &str) -> Option<u32> {
    let spaced = normalize_spaces(text);

    if let Some(caps) = DOLLAR_SUFFIX_RE.captures(&spaced) {
        let digits: String = caps[1].chars().filter(char::is_ascii_digit).collect();
        if let Some(n) = parse_digits(&digits).and_then(|n| bounds::DOLLAR_VALUE.accept(n)) {
            return Some(n);
        }
    }

    let cleaned: String = spaced
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    let caps = LOOSE_DOLLAR_RE.captures(&cleaned)?;
    parse_digits(&caps[1]).and_then(|n| bounds::DOLLAR_VALUE.accept(n))
}

/// First digit run of `text` once all whitespace is removed.
#[must_use]
pub fn extract_number(text: &str) -> Option<u32> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    DIGITS_RE
        .find(&compact)
        .and_then(|m| parse_digits(m.as_str()))
}

/// Parses a grouped number such as `"60 000"` or `"1,500"`.
pub(crate) fn parse_grouped(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    parse_digits(&digits)
}

fn parse_digits(digits: &str) -> Option<u32> {
    digits.parse::<u64>().ok().and_then(|n| u32::try_from(n).ok())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
