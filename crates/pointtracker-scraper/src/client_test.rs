use super::*;

#[test]
fn checked_url_accepts_https() {
    let url = PageClient::checked_url("https://milesopedia.com/cartes-de-credit/carte-td/").unwrap();
    assert_eq!(url.host_str(), Some("milesopedia.com"));
}

#[test]
fn checked_url_trims_whitespace() {
    let url = PageClient::checked_url("  http://localhost:8080/x  ").unwrap();
    assert_eq!(url.as_str(), "http://localhost:8080/x");
}

#[test]
fn checked_url_rejects_relative_path() {
    let err = PageClient::checked_url("/cartes-de-credit/carte-td/").unwrap_err();
    assert!(matches!(err, ScraperError::InvalidUrl { .. }));
}

#[test]
fn checked_url_rejects_other_schemes() {
    let err = PageClient::checked_url("ftp://milesopedia.com/x").unwrap_err();
    match err {
        ScraperError::InvalidUrl { reason, .. } => assert!(reason.contains("ftp")),
        other => panic!("expected InvalidUrl, got {other:?}"),
    }
}

#[test]
fn zero_attempts_is_raised_to_one() {
    let client = PageClient::new(Duration::from_secs(5), "pointtracker-test/0.1", 0, 0).unwrap();
    assert_eq!(client.max_attempts, 1);
}
