//! Writes canned mock responses.

use axum::body::Body;
use axum::response::Response;

use crate::mock::types::MockResponse;

/// Build the HTTP response for a matched mock.
///
/// Headers are written in declaration order, then the status, then the body
/// verbatim. No templating is applied.
pub fn respond(mock: &MockResponse) -> Response {
    let mut response = Response::new(Body::from(mock.body.clone()));
    let headers = response.headers_mut();
    for (name, value) in &mock.headers {
        headers.append(name.clone(), value.clone());
    }
    *response.status_mut() = mock.status;
    response
}

/// Wait for the configured delay, then build the response.
pub async fn respond_delayed(mock: &MockResponse) -> Response {
    if let Some(delay) = mock.delay {
        tokio::time::sleep(delay).await;
    }
    respond(mock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_writes_status_headers_and_body() {
        let mock = MockResponse::new(StatusCode::CREATED, "{id:5}")
            .with_header(
                HeaderName::from_static("content-type"),
                HeaderValue::from_static("application/json"),
            )
            .with_header(HeaderName::from_static("x-multi"), HeaderValue::from_static("a"))
            .with_header(HeaderName::from_static("x-multi"), HeaderValue::from_static("b"));

        let response = respond(&mock);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["content-type"], "application/json");
        let multi: Vec<_> = response.headers().get_all("x-multi").iter().collect();
        assert_eq!(multi, vec!["a", "b"]);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"{id:5}");
    }

    #[tokio::test]
    async fn test_honors_delay() {
        let mock = MockResponse::new(StatusCode::OK, "late").with_delay(Duration::from_millis(50));
        let started = Instant::now();
        let response = respond_delayed(&mock).await;
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(response.status(), StatusCode::OK);
    }
}
