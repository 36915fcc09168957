//! Permissive CORS headers and preflight short-circuit.
//!
//! # Design Decisions
//! - CORS headers are present on every response, mocked or forwarded
//! - Injected values come first; values an inner stage produced for the same
//!   names are kept after them
//! - `OPTIONS` is answered locally with 200 and no body

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode};
use axum::response::Response;

use crate::http::chain::{HandlerError, Middleware, SharedHandler};
use crate::observability::metrics;

const CORS_HEADERS: [HeaderName; 3] = [
    ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_HEADERS,
];

/// Put `*` for each CORS header in front of any existing values.
pub fn inject_cors_headers(headers: &mut HeaderMap) {
    let wildcard = HeaderValue::from_static("*");
    for name in CORS_HEADERS {
        let existing: Vec<HeaderValue> = headers.get_all(&name).iter().cloned().collect();
        headers.insert(name.clone(), wildcard.clone());
        for value in existing {
            headers.append(name.clone(), value);
        }
    }
}

/// Adds the permissive CORS headers to every response.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorsMiddleware;

impl Middleware for CorsMiddleware {
    fn wrap(&self, next: SharedHandler) -> SharedHandler {
        Arc::new(move |request: Request<Body>| {
            let next = next.clone();
            async move {
                let mut response = next.call(request).await?;
                inject_cors_headers(response.headers_mut());
                Ok::<_, HandlerError>(response)
            }
        })
    }
}

/// Answers `OPTIONS` requests without calling the rest of the chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreflightMiddleware;

impl Middleware for PreflightMiddleware {
    fn wrap(&self, next: SharedHandler) -> SharedHandler {
        Arc::new(move |request: Request<Body>| {
            let next = next.clone();
            async move {
                if request.method() == Method::OPTIONS {
                    let start = Instant::now();
                    tracing::debug!(path = %request.uri().path(), "Answering preflight");
                    let mut response = Response::new(Body::empty());
                    *response.status_mut() = StatusCode::OK;
                    metrics::record_request("OPTIONS", 200, metrics::ROUTE_PREFLIGHT, start);
                    return Ok(response);
                }
                next.call(request).await
            }
        })
    }
}
