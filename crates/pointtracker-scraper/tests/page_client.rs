//! Integration tests for `PageClient` against a local mock server.

mod common;

use std::time::Duration;

use pointtracker_scraper::ScraperError;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{test_client, TEST_UA};

#[tokio::test]
async fn sends_user_agent_and_french_language_preference() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cartes-de-credit/carte-a/"))
        .and(header("user-agent", TEST_UA))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(Duration::from_secs(5), 3);
    let body = client
        .fetch_text(&format!("{}/cartes-de-credit/carte-a/", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "<html>ok</html>");

    let requests = server.received_requests().await.unwrap();
    let language = requests[0]
        .headers
        .get("accept-language")
        .and_then(|v| v.to_str().ok());
    assert_eq!(language, Some("fr-CA,fr;q=0.9,en;q=0.8"));
}

#[tokio::test]
async fn not_found_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(Duration::from_secs(5), 3);
    let err = client
        .fetch_text(&format!("{}/missing/", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn server_error_is_reported_once_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(Duration::from_secs(5), 3);
    let err = client
        .fetch_text(&format!("{}/busy/", server.uri()))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::UnexpectedStatus { status: 503, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn timeout_is_retried_up_to_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_string("too late"),
        )
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(Duration::from_millis(200), 3);
    let err = client
        .fetch_text(&format!("{}/slow/", server.uri()))
        .await
        .unwrap_err();
    match err {
        ScraperError::Http(e) => assert!(e.is_timeout(), "expected timeout, got {e}"),
        other => panic!("expected Http timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn non_http_scheme_is_rejected_before_any_request() {
    let client = test_client(Duration::from_secs(5), 1);
    let err = client.fetch_text("ftp://milesopedia.com/x").await.unwrap_err();
    assert!(matches!(err, ScraperError::InvalidUrl { .. }));
}
