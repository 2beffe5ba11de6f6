use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use sumi_fetch::config::{FetcherConfig, UserAgentConfig};
use sumi_fetch::url::default_validator;
use sumi_fetch::{aggregate, FailureKind, FetchOutcome, Fetcher, Page, ReqwestClient};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reqwest_fetcher(fetcher_config: &FetcherConfig) -> Fetcher {
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: None,
    };
    let client =
        ReqwestClient::from_config(&user_agent, fetcher_config).expect("Failed to build client");
    Fetcher::new(client, default_validator())
}

/// Returns a URL on a port nothing listens on
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

#[tokio::test]
async fn test_body_round_trip() {
    let mock_server = MockServer::start().await;
    let body: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();

    Mock::given(method("GET"))
        .and(path("/blob"))
        .and(header("user-agent", "TestBot/1.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&mock_server)
        .await;

    let fetcher = reqwest_fetcher(&FetcherConfig::default());
    let outcome = fetcher.fetch(&format!("{}/blob", mock_server.uri())).await;

    assert_eq!(
        outcome,
        FetchOutcome::Success(Page {
            content: body,
            status_code: 200,
        })
    );
}

#[tokio::test]
async fn test_status_preserved_for_non_404() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/teapot"))
        .respond_with(ResponseTemplate::new(418).set_body_string("short and stout"))
        .mount(&mock_server)
        .await;

    let fetcher = reqwest_fetcher(&FetcherConfig::default());
    let outcome = fetcher.fetch(&format!("{}/teapot", mock_server.uri())).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.status_code(), Some(418));
    assert_eq!(outcome.content(), b"short and stout");
}

#[tokio::test]
async fn test_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>not here</html>"))
        .mount(&mock_server)
        .await;

    let fetcher = reqwest_fetcher(&FetcherConfig::default());
    let outcome = fetcher
        .fetch(&format!("{}/missing", mock_server.uri()))
        .await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::NotFound));
    assert_eq!(outcome.status_code(), Some(404));
    assert!(outcome.content().is_empty());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let fetcher = reqwest_fetcher(&FetcherConfig::default());

    let outcome = fetcher.fetch(&closed_port_url()).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Transport));
}

#[tokio::test]
async fn test_request_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let config = FetcherConfig {
        request_timeout_ms: 200,
        ..FetcherConfig::default()
    };
    let fetcher = reqwest_fetcher(&config);
    let outcome = fetcher.fetch(&format!("{}/slow", mock_server.uri())).await;

    match outcome {
        FetchOutcome::Failure(failure) => {
            assert_eq!(failure.kind, FailureKind::Transport);
            assert!(failure.message.contains("timed out"));
        }
        other => panic!("expected a transport failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_body_limit_against_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(4096)))
        .mount(&mock_server)
        .await;

    let fetcher = reqwest_fetcher(&FetcherConfig::default()).with_max_body_bytes(Some(1024));
    let outcome = fetcher.fetch(&format!("{}/big", mock_server.uri())).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Read));
    assert_eq!(outcome.status_code(), Some(200));
}

#[tokio::test]
async fn test_scheme_less_url_uses_default_scheme() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain http"))
        .mount(&mock_server)
        .await;

    let config = FetcherConfig {
        default_scheme: "http".to_string(),
        ..FetcherConfig::default()
    };
    let client = ReqwestClient::from_config(&UserAgentConfig::default(), &config)
        .expect("Failed to build client");
    let fetcher = Fetcher::new(client, |_: &str| true);

    let address = mock_server.address();
    let outcome = fetcher.fetch(&format!("{}/page", address)).await;

    assert_eq!(outcome.content(), b"plain http");
}

#[tokio::test]
async fn test_mixed_batch_against_server() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    for i in 0..4 {
        Mock::given(method("GET"))
            .and(path(format!("/page{}", i)))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("page {}", i)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut urls: Vec<String> = (0..4).map(|i| format!("{}/page{}", base, i)).collect();
    urls.push(format!("{}/gone", base));
    urls.push("example.com".to_string());
    urls.push(closed_port_url());

    let fetcher = Arc::new(reqwest_fetcher(&FetcherConfig::default()));
    let records = aggregate(urls.clone(), fetcher, 3)
        .await
        .expect("aggregate failed");

    assert_eq!(records.len(), urls.len());

    let by_url: HashMap<&str, &FetchOutcome> = records
        .iter()
        .map(|r| (r.url.as_str(), &r.outcome))
        .collect();
    assert_eq!(by_url.len(), urls.len());

    for i in 0..4 {
        let outcome = by_url[format!("{}/page{}", base, i).as_str()];
        assert_eq!(outcome.content(), format!("page {}", i).as_bytes());
    }
    assert_eq!(
        by_url[format!("{}/gone", base).as_str()].failure_kind(),
        Some(FailureKind::NotFound)
    );
    assert_eq!(
        by_url["example.com"].failure_kind(),
        Some(FailureKind::InvalidUrl)
    );
    assert_eq!(
        by_url[urls[6].as_str()].failure_kind(),
        Some(FailureKind::Transport)
    );

    // Mock expectations (each page requested exactly once) are verified on drop
}
