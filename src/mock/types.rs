//! Mock rule and canned response types.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};

use crate::routing::matcher::PathPattern;

/// A match-and-respond directive.
#[derive(Debug, Clone)]
pub struct MockRule {
    pub path: PathPattern,
    pub method: Option<String>,
    pub queries: Vec<(String, String)>,
    pub headers: Vec<(HeaderName, String)>,
    pub response: MockResponse,
}

impl MockRule {
    /// A rule constrained by path only.
    pub fn new(path: PathPattern, response: MockResponse) -> Self {
        Self {
            path,
            method: None,
            queries: Vec::new(),
            headers: Vec::new(),
            response,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        let method = method.into();
        self.method = (!method.is_empty()).then_some(method);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.queries.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// A rule is discriminated when it constrains method, query or headers.
    pub fn is_discriminated(&self) -> bool {
        self.method.is_some() || !self.queries.is_empty() || !self.headers.is_empty()
    }

    /// Matches every request: empty path and no discriminators.
    pub fn is_global_default(&self) -> bool {
        self.path.is_any() && !self.is_discriminated()
    }
}

/// The canned response of a rule. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: StatusCode,
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub body: Bytes,
    pub delay: Option<Duration>,
}

impl MockResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            delay: None,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}
