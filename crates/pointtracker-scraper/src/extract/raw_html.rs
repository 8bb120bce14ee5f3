//! Fallback for a welcome-offer cell that the DOM view reports as empty.
//!
//! When the cell is filled client-side the parsed tree can miss it while the
//! raw source still carries the inner markup, so the same element id is
//! located in the unparsed string instead.

use std::sync::LazyLock;

use regex::Regex;

use super::PartialCard;
use crate::bounds;
use crate::normalize::{collapse_whitespace, extract_dollar_value, extract_number, normalize_spaces};

static Y1_CELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)id=["']welcome_offer_year_one["'][^>]*>(.*?)</div\s*>"#)
        .expect("valid regex")
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

#[must_use]
pub fn extract(html: &str) -> PartialCard {
    PartialCard {
        welcome_value_y1: welcome_value_y1(html),
        ..PartialCard::default()
    }
}

fn welcome_value_y1(html: &str) -> Option<u32> {
    let inner = Y1_CELL_RE.captures(html)?.get(1)?.as_str();
    let text = collapse_whitespace(&normalize_spaces(&TAG_RE.replace_all(inner, " ")));
    if text.is_empty() {
        return None;
    }
    extract_dollar_value(&text)
        .or_else(|| extract_number(&text))
        .and_then(|n| bounds::WELCOME_VALUE_Y1.accept(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_inside_the_cell() {
        let html = r#"<div id="welcome_offer_year_one"><span class="text-black">1&nbsp;500&nbsp;$</span></div>"#;
        assert_eq!(extract(html).welcome_value_y1, Some(1_500));
    }

    #[test]
    fn single_quoted_id_and_extra_attributes() {
        let html = "<div id='welcome_offer_year_one' class='x'>\n  <b>275 $</b>\n</div >";
        assert_eq!(extract(html).welcome_value_y1, Some(275));
    }

    #[test]
    fn empty_cell_yields_nothing() {
        let html = r#"<div id="welcome_offer_year_one">   </div>"#;
        assert_eq!(extract(html).welcome_value_y1, None);
    }

    #[test]
    fn missing_cell_yields_nothing() {
        assert_eq!(extract("<div id=\"other\">300 $</div>"), PartialCard::default());
    }
}
