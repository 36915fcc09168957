//! Forwarding of unmatched requests to the upstream API.
//!
//! # Responsibilities
//! - Rewrite the request target onto the upstream base
//! - Copy request headers, minus `Origin` and `Host`
//! - Stream the request body upstream unchanged
//! - Relay status, headers and body of the upstream response verbatim
//!
//! # Design Decisions
//! - No retries: construction or dispatch failures become a single 500
//! - Bodies are streamed in both directions, never buffered
//! - The upstream body is released when the relayed body is dropped

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use hyper::body::Incoming;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::http::chain::{Handler, HandlerError, HandlerResult};
use crate::http::headers::{copy_headers, UPSTREAM_EXCLUDED};
use crate::http::target::ProxyTarget;
use crate::observability::metrics;

/// Client used for upstream calls (plain HTTP and HTTPS).
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Error returned when the upstream TLS connector cannot be configured.
#[derive(Debug, thiserror::Error)]
#[error("failed to configure upstream TLS: {0}")]
pub struct ClientError(#[source] Box<dyn std::error::Error + Send + Sync>);

/// Build the upstream client for one server session.
///
/// Uses the ring provider explicitly; no process-level provider is required.
pub fn build_client() -> Result<UpstreamClient, ClientError> {
    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())
        .map_err(|e| ClientError(e.into()))?
        .https_or_http()
        .enable_http1()
        .build();
    Ok(Client::builder(TokioExecutor::new()).build(https))
}

/// Terminal stage of the chain: proxies the request upstream.
#[derive(Clone)]
pub struct ForwardingHandler {
    target: Arc<ProxyTarget>,
    client: UpstreamClient,
}

impl ForwardingHandler {
    pub fn new(target: Arc<ProxyTarget>, client: UpstreamClient) -> Self {
        Self { target, client }
    }

    /// Forward one request and produce the client response.
    pub async fn forward(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let (parts, body) = request.into_parts();
        let method = parts.method.as_str().to_string();
        let uri = self.target.request_uri(parts.uri.path_and_query());

        let mut upstream_request = match Request::builder()
            .method(parts.method.clone())
            .uri(uri.as_str())
            .body(body)
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(method = %method, uri = %uri, error = %e, "Failed to create upstream request");
                metrics::record_request(&method, 500, metrics::ROUTE_FORWARD, start);
                return failure("Failed to create request");
            }
        };
        copy_headers(upstream_request.headers_mut(), &parts.headers, &UPSTREAM_EXCLUDED);

        tracing::debug!(method = %method, uri = %uri, "Forwarding request");

        match self.client.request(upstream_request).await {
            Ok(upstream) => {
                let response = relay_response(upstream);
                tracing::debug!(
                    method = %method,
                    uri = %uri,
                    status = response.status().as_u16(),
                    "Upstream responded"
                );
                metrics::record_request(
                    &method,
                    response.status().as_u16(),
                    metrics::ROUTE_FORWARD,
                    start,
                );
                response
            }
            Err(e) => {
                tracing::error!(method = %method, uri = %uri, error = %e, "Upstream request failed");
                metrics::record_request(&method, 500, metrics::ROUTE_FORWARD, start);
                failure("Failed to make request to target URL")
            }
        }
    }
}

impl Handler for ForwardingHandler {
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, HandlerResult> {
        let this = self.clone();
        Box::pin(async move { Ok::<_, HandlerError>(this.forward(request).await) })
    }
}

/// Copy status and every header of the upstream response, and stream its body.
fn relay_response(upstream: Response<Incoming>) -> Response {
    let (parts, body) = upstream.into_parts();
    let mut response = Response::new(Body::new(body));
    *response.status_mut() = parts.status;
    copy_headers(response.headers_mut(), &parts.headers, &[]);
    response
}

fn failure(message: &'static str) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
}
