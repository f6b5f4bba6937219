//! Integration tests for HttpProbe using wiremock

use livecheck::checker::{HttpProbe, Probe, QuorumEngine};
use livecheck::config::ProbeConfig;
use livecheck::utils::error::ProbeError;
use livecheck::utils::retry::BackoffPolicy;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn probe() -> HttpProbe {
    HttpProbe::new(&ProbeConfig::default()).unwrap()
}

#[tokio::test]
async fn test_ok_status_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/live.m3u8"))
        .respond_with(ResponseTemplate::new(200).set_body_string("#EXTM3U"))
        .mount(&server)
        .await;

    let address = format!("{}/live.m3u8", server.uri());
    let outcome = probe().attempt(&address, Duration::from_secs(2)).await;

    tokio_test::assert_ok!(outcome);
}

#[tokio::test]
async fn test_non_ok_status_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let probe = probe();
    for (route, status) in [("/missing", 404), ("/error", 500), ("/empty", 204)] {
        let address = format!("{}{route}", server.uri());
        match probe.attempt(&address, Duration::from_secs(2)).await {
            Err(ProbeError::Status(code)) => assert_eq!(code, status),
            other => panic!("expected status error for {route}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let address = format!("{}/slow", server.uri());
    let outcome = probe().attempt(&address, Duration::from_millis(200)).await;

    assert!(matches!(outcome, Err(ProbeError::Timeout)));
}

#[tokio::test]
async fn test_address_without_scheme_is_rejected() {
    let outcome = probe().attempt("not-a-url", Duration::from_secs(1)).await;
    assert!(matches!(outcome, Err(ProbeError::InvalidAddress(_))));
}

#[tokio::test]
async fn test_unreachable_host_is_failure() {
    // Port 9 (discard) is not expected to serve HTTP
    let outcome = probe().attempt("http://127.0.0.1:9/", Duration::from_secs(1)).await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn test_probe_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = probe().attempt(&server.uri(), Duration::from_secs(2)).await;
    tokio_test::assert_ok!(outcome);
}

#[tokio::test]
async fn test_quorum_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/up"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let engine = QuorumEngine::new(3, Duration::from_secs(2), BackoffPolicy::none());
    let probe = probe();

    let up = engine.evaluate(&probe, &format!("{}/up", server.uri())).await;
    assert!(up.alive);
    assert_eq!(up.successes, 3);

    let down = engine.evaluate(&probe, &format!("{}/down", server.uri())).await;
    assert!(!down.alive);
    assert_eq!(down.successes, 0);
    assert_eq!(down.last_error.as_deref(), Some("Unexpected status: 503"));
}
