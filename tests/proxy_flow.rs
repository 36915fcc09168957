//! End-to-end tests over real sockets: client → relay → upstream.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use reqwest::Method;

use cors_relay::routing::matcher::PathPattern;
use cors_relay::{ControllerState, MockResponse, MockRule};

mod common;

fn mock(path: &str, body: &'static str) -> MockRule {
    MockRule::new(
        PathPattern::parse(path).unwrap(),
        MockResponse::new(StatusCode::OK, body),
    )
}

fn assert_cors(headers: &reqwest::header::HeaderMap) {
    for name in [
        "access-control-allow-origin",
        "access-control-allow-methods",
        "access-control-allow-headers",
    ] {
        assert_eq!(headers.get(name).unwrap(), "*", "{name}");
    }
}

#[tokio::test]
async fn test_forwarded_request_reaches_upstream_without_origin() {
    let upstream = common::start_upstream().await;
    let (relay, addr) = common::start_relay(&upstream.url(), Vec::new()).await;

    let res = common::client()
        .post(format!("http://{}/items/7?sort=desc&page=2", addr))
        .header("origin", "http://localhost:3000")
        .header("x-trace", "abc")
        .body("payload")
        .send()
        .await
        .expect("Relay unreachable");
    assert_eq!(res.status(), 201);

    let seen = upstream.requests();
    assert_eq!(seen.len(), 1);
    let request = &seen[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.uri.path(), "/items/7");
    assert_eq!(request.uri.query(), Some("sort=desc&page=2"));
    assert!(request.headers.get("origin").is_none());
    assert_eq!(request.headers.get("x-trace").unwrap(), "abc");
    assert_eq!(
        request.headers.get("host").unwrap(),
        upstream.addr.to_string().as_str()
    );
    assert_eq!(&request.body[..], b"payload");

    relay.stop().await;
}

#[tokio::test]
async fn test_upstream_response_relayed_verbatim() {
    let upstream = common::start_upstream().await;
    let (relay, addr) = common::start_relay(&upstream.url(), Vec::new()).await;

    let res = common::client()
        .get(format!("http://{}/items", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 201);
    let values: Vec<_> = res.headers().get_all("x-upstream").iter().collect();
    assert_eq!(values, vec!["one", "two"]);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "application/octet-stream"
    );
    assert_cors(res.headers());
    assert_eq!(&res.bytes().await.unwrap()[..], common::UPSTREAM_BODY);
    assert_eq!(upstream.hits(), 1);

    relay.stop().await;
}

#[tokio::test]
async fn test_preflight_never_reaches_upstream() {
    let upstream = common::start_upstream().await;
    let rules = vec![mock("/items", "mocked")];
    let (relay, addr) = common::start_relay(&upstream.url(), rules).await;

    let res = common::client()
        .request(Method::OPTIONS, format!("http://{}/items", addr))
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "DELETE")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_cors(res.headers());
    assert!(res.bytes().await.unwrap().is_empty());
    assert_eq!(upstream.hits(), 0);

    relay.stop().await;
}

#[tokio::test]
async fn test_method_mock_short_circuits() {
    let upstream = common::start_upstream().await;
    let rules = vec![mock("/users", "[]").with_method("GET")];
    let (relay, addr) = common::start_relay(&upstream.url(), rules).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/users", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_cors(res.headers());
    assert_eq!(res.text().await.unwrap(), "[]");
    assert_eq!(upstream.hits(), 0);

    // Same path, other method: forwarded
    let res = client
        .delete(format!("http://{}/users", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    assert_eq!(upstream.hits(), 1);

    relay.stop().await;
}

#[tokio::test]
async fn test_query_mock_ignores_extra_params() {
    let upstream = common::start_upstream().await;
    let rules = vec![mock("/users", "{id:5}").with_query("id", "5")];
    let (relay, addr) = common::start_relay(&upstream.url(), rules).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/users?id=5&trace=1", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "{id:5}");

    let res = client
        .get(format!("http://{}/users?id=6", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    assert_eq!(upstream.hits(), 1);

    relay.stop().await;
}

#[tokio::test]
async fn test_header_mock_and_response_headers() {
    let upstream = common::start_upstream().await;
    let response = MockResponse::new(StatusCode::IM_A_TEAPOT, "brewing")
        .with_header(
            HeaderName::from_static("x-mock"),
            HeaderValue::from_static("yes"),
        )
        .with_header(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("text/plain"),
        );
    let rules = vec![MockRule::new(PathPattern::any(), response)
        .with_header(HeaderName::from_static("x-env"), "staging")];
    let (relay, addr) = common::start_relay(&upstream.url(), rules).await;

    let res = common::client()
        .get(format!("http://{}/anything/at/all", addr))
        .header("X-Env", "staging")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 418);
    assert_eq!(res.headers().get("x-mock").unwrap(), "yes");
    assert_eq!(res.headers().get("content-type").unwrap(), "text/plain");
    assert_cors(res.headers());
    assert_eq!(res.text().await.unwrap(), "brewing");
    assert_eq!(upstream.hits(), 0);

    relay.stop().await;
}

#[tokio::test]
async fn test_mock_delay_is_applied() {
    let upstream = common::start_upstream().await;
    let response = MockResponse::new(StatusCode::OK, "slow").with_delay(Duration::from_millis(150));
    let rules = vec![MockRule::new(PathPattern::parse("/slow").unwrap(), response)];
    let (relay, addr) = common::start_relay(&upstream.url(), rules).await;

    let started = std::time::Instant::now();
    let res = common::client()
        .get(format!("http://{}/slow", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "slow");
    assert!(started.elapsed() >= Duration::from_millis(150));

    relay.stop().await;
}

#[tokio::test]
async fn test_unreachable_upstream_yields_500() {
    let dead = common::closed_addr().await;
    let (relay, addr) = common::start_relay(&format!("http://{}", dead), Vec::new()).await;

    let res = common::client()
        .get(format!("http://{}/items", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    assert_cors(res.headers());
    assert_eq!(
        res.text().await.unwrap(),
        "Failed to make request to target URL"
    );
    assert_eq!(relay.state(), ControllerState::Running);

    relay.stop().await;
}

#[tokio::test]
async fn test_stopped_relay_refuses_connections() {
    let upstream = common::start_upstream().await;
    let (relay, addr) = common::start_relay(&upstream.url(), Vec::new()).await;

    relay.stop().await;
    relay.stop().await;
    assert_eq!(relay.state(), ControllerState::Idle);

    let result = common::client()
        .get(format!("http://{}/items", addr))
        .timeout(Duration::from_secs(2))
        .send()
        .await;
    assert!(result.is_err());
    assert_eq!(upstream.hits(), 0);
}
