mod common;

use std::time::Duration;

use faver_http::HttpClient;
use faver_web::{FaviconError, FaviconFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, head: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::html_with_head(head)))
        .mount(server)
        .await;
}

async fn mount_icon(server: &MockServer, at: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn downloads_every_discovered_icon_in_order() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    mount_page(
        &server,
        r#"<link rel="icon" href="/a.png"><link rel="shortcut icon" href="/b.ico">"#,
    )
    .await;
    mount_icon(&server, "/a.png", b"\x89PNG-a").await;
    mount_icon(&server, "/b.ico", b"\x00\x00\x01\x00-b").await;

    let fetcher = FaviconFetcher::new(HttpClient::new().unwrap());
    let icons = fetcher.fetch_favicons(&server.uri()).await.unwrap();

    assert_eq!(icons, vec![b"\x89PNG-a".to_vec(), b"\x00\x00\x01\x00-b".to_vec()]);
}

#[tokio::test]
async fn fallback_icon_is_downloaded() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    mount_page(&server, "").await;
    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"root-icon".to_vec()))
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = FaviconFetcher::new(HttpClient::new().unwrap());
    let icons = fetcher.fetch_favicons(&server.uri()).await.unwrap();

    assert_eq!(icons, vec![b"root-icon".to_vec()]);
}

#[tokio::test]
async fn second_download_failure_discards_everything() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    mount_page(
        &server,
        r#"<link rel="icon" href="/fast.ico"><link rel="icon" href="/slow.ico">"#,
    )
    .await;
    mount_icon(&server, "/fast.ico", b"fast").await;
    Mock::given(method("GET"))
        .and(path("/slow.ico"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"slow".to_vec())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let fetcher = FaviconFetcher::new(common::quick_client());
    let err = fetcher.fetch_favicons(&server.uri()).await.unwrap_err();

    assert!(matches!(err, FaviconError::Fetch(_)), "got {err:?}");
}

#[tokio::test]
async fn repeated_fetches_are_identical() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    mount_page(&server, r#"<link rel="icon" href="/stable.ico">"#).await;
    mount_icon(&server, "/stable.ico", &[7u8; 64]).await;

    let fetcher = FaviconFetcher::new(HttpClient::new().unwrap());
    let first = fetcher.fetch_favicons(&server.uri()).await.unwrap();
    let second = fetcher.fetch_favicons(&server.uri()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, vec![vec![7u8; 64]]);
}

#[tokio::test]
async fn unreachable_target_fails_the_whole_fetch() {
    common::init_test_tracing();
    let fetcher = FaviconFetcher::new(HttpClient::new().unwrap());
    let err = fetcher
        .fetch_favicons("http://127.0.0.1:1")
        .await
        .unwrap_err();

    assert!(matches!(err, FaviconError::Fetch(_)), "got {err:?}");
}
