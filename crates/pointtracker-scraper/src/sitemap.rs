//! Card sitemap discovery.
//!
//! Each `<url>` entry contributes one URL: its `fr-CA` alternate link when
//! present, else its `<loc>`. Only credit-card detail paths are kept.

use pointtracker_core::CardListingCandidate;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ScraperError;

const PREFERRED_HREFLANG: &str = "fr-CA";
const CARD_PATH_MARKERS: &[&str] = &["/cartes-de-credit/", "/en/credit-cards/"];
/// Listing pages share the card path prefix but are not cards.
const LISTING_SLUGS: &[&str] = &["cartes-de-credit", "credit-cards"];

/// Parses a sitemap into deduplicated card candidates, in document order.
/// Relative URLs are resolved against `base_url`.
///
/// # Errors
///
/// Returns [`ScraperError::Xml`] if the document is not well-formed.
pub fn parse_sitemap(xml: &str, base_url: &str) -> Result<Vec<CardListingCandidate>, ScraperError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let base = reqwest::Url::parse(base_url).ok();
    let mut candidates: Vec<CardListingCandidate> = Vec::new();
    let mut in_url = false;
    let mut in_loc = false;
    let mut loc = String::new();
    let mut localized: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"url" => {
                    in_url = true;
                    loc.clear();
                    localized = None;
                }
                b"loc" if in_url => in_loc = true,
                b"link" if in_url => localized = localized.or_else(|| preferred_href(&e)),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if in_url && e.local_name().as_ref() == b"link" {
                    localized = localized.or_else(|| preferred_href(&e));
                }
            }
            Ok(Event::Text(e)) => {
                if in_loc {
                    loc.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::CData(e)) => {
                if in_loc {
                    loc.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"loc" => in_loc = false,
                b"url" if in_url => {
                    in_url = false;
                    let raw = localized.take().unwrap_or_else(|| loc.trim().to_string());
                    if let Some(url) = card_url(&raw, base.as_ref()) {
                        if !candidates.iter().any(|c| c.url == url) {
                            candidates.push(CardListingCandidate::from_url(url));
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ScraperError::Xml(e)),
            _ => {}
        }
    }

    Ok(candidates)
}

/// `href` of an alternate link in the preferred language.
fn preferred_href(e: &BytesStart<'_>) -> Option<String> {
    let mut hreflang = None;
    let mut href = None;
    for attr in e.attributes().flatten() {
        let value = attr.unescape_value().ok().map(|v| v.trim().to_string());
        match attr.key.local_name().as_ref() {
            b"hreflang" => hreflang = value,
            b"href" => href = value,
            _ => {}
        }
    }
    if hreflang.as_deref() == Some(PREFERRED_HREFLANG) {
        href.filter(|h| !h.is_empty())
    } else {
        None
    }
}

/// Absolute URL for `raw` when it points at a card detail page.
fn card_url(raw: &str, base: Option<&reqwest::Url>) -> Option<String> {
    if raw.is_empty() || !CARD_PATH_MARKERS.iter().any(|m| raw.contains(m)) {
        return None;
    }
    let absolute = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        base?.join(raw).ok()?.to_string()
    };
    let slug = pointtracker_core::slug_from_url(&absolute);
    if slug.is_empty() || LISTING_SLUGS.contains(&slug.as_str()) {
        return None;
    }
    Some(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://milesopedia.com";

    #[test]
    fn prefers_french_alternate_over_loc() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:xhtml="http://www.w3.org/1999/xhtml">
  <url>
    <loc>https://milesopedia.com/en/credit-cards/td-aeroplan-visa-infinite/</loc>
    <xhtml:link rel="alternate" hreflang="en-CA" href="https://milesopedia.com/en/credit-cards/td-aeroplan-visa-infinite/"/>
    <xhtml:link rel="alternate" hreflang="fr-CA" href="https://milesopedia.com/cartes-de-credit/carte-td-aeroplan-visa-infinite/"/>
  </url>
</urlset>"#;
        let candidates = parse_sitemap(xml, BASE).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].url,
            "https://milesopedia.com/cartes-de-credit/carte-td-aeroplan-visa-infinite/"
        );
        assert_eq!(candidates[0].slug, "carte-td-aeroplan-visa-infinite");
    }

    #[test]
    fn falls_back_to_loc_and_filters_non_card_paths() {
        let xml = r#"<urlset>
  <url><loc>https://milesopedia.com/en/credit-cards/rbc-avion/</loc></url>
  <url><loc>https://milesopedia.com/blogue/meilleures-cartes/</loc></url>
  <url><loc>https://milesopedia.com/cartes-de-credit/</loc></url>
</urlset>"#;
        let candidates = parse_sitemap(xml, BASE).unwrap();
        let slugs: Vec<_> = candidates.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["rbc-avion"]);
    }

    #[test]
    fn deduplicates_by_full_url() {
        let xml = r#"<urlset>
  <url><loc>https://milesopedia.com/cartes-de-credit/carte-a/</loc></url>
  <url><loc>https://milesopedia.com/cartes-de-credit/carte-a/</loc></url>
  <url><loc>https://milesopedia.com/cartes-de-credit/carte-b/</loc></url>
</urlset>"#;
        let candidates = parse_sitemap(xml, BASE).unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn resolves_relative_urls_against_base() {
        let xml = "<urlset><url><loc>/cartes-de-credit/carte-c/</loc></url></urlset>";
        let candidates = parse_sitemap(xml, BASE).unwrap();
        assert_eq!(
            candidates[0].url,
            "https://milesopedia.com/cartes-de-credit/carte-c/"
        );
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let result = parse_sitemap("<urlset><url><loc>x</url></urlset>", BASE);
        assert!(matches!(result, Err(ScraperError::Xml(_))));
    }

    #[test]
    fn empty_urlset_yields_no_candidates() {
        assert!(parse_sitemap("<urlset></urlset>", BASE).unwrap().is_empty());
    }
}
