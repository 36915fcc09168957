//! Request predicates used by the dispatch table.
//!
//! # Responsibilities
//! - Match the request path against an exact pattern
//! - Match the request method (case-sensitive)
//! - Match required query parameters and headers
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Path matching is exact and case-sensitive; `{name}` segments match any
//!   single non-empty segment
//! - Header names are case-insensitive, values are exact
//! - Query keys and values are case-sensitive and compared after decoding
//! - Extra query parameters and headers on the request are ignored
//! - No regex to guarantee O(n) matching

use axum::body::Body;
use axum::http::{HeaderName, Request};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Error returned when a path pattern cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("path pattern must start with '/': {0:?}")]
    MissingLeadingSlash(String),
    #[error("unbalanced braces in path segment {0:?}")]
    UnbalancedBraces(String),
    #[error("empty variable name in path segment {0:?}")]
    EmptyVariable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A compiled path pattern.
///
/// The empty pattern matches every path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathPattern {
    source: String,
    segments: Option<Vec<Segment>>,
}

impl PathPattern {
    /// The pattern that matches every path.
    pub fn any() -> Self {
        Self::default()
    }

    /// Parse a pattern such as `/users/{id}/posts`.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Ok(Self::any());
        }
        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(pattern.to_string()))?;

        let mut segments = Vec::new();
        for raw in rest.split('/') {
            let opens = raw.matches('{').count();
            let closes = raw.matches('}').count();
            if opens == 0 && closes == 0 {
                segments.push(Segment::Literal(raw.to_string()));
                continue;
            }
            let name = raw
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .filter(|_| opens == 1 && closes == 1)
                .ok_or_else(|| PatternError::UnbalancedBraces(raw.to_string()))?;
            if name.is_empty() {
                return Err(PatternError::EmptyVariable(raw.to_string()));
            }
            segments.push(Segment::Variable(name.to_string()));
        }

        Ok(Self {
            source: pattern.to_string(),
            segments: Some(segments),
        })
    }

    /// True for the catch-all (empty) pattern.
    pub fn is_any(&self) -> bool {
        self.segments.is_none()
    }

    /// The pattern as written in the configuration.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check a request path against the pattern.
    pub fn matches_path(&self, path: &str) -> bool {
        let Some(segments) = &self.segments else {
            return true;
        };
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };

        let mut parts = rest.split('/');
        for segment in segments {
            let Some(part) = parts.next() else {
                return false;
            };
            let ok = match segment {
                Segment::Literal(lit) => part == lit,
                Segment::Variable(_) => !part.is_empty(),
            };
            if !ok {
                return false;
            }
        }
        parts.next().is_none()
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_any() {
            f.write_str("*")
        } else {
            f.write_str(&self.source)
        }
    }
}

/// Matches the request path.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pattern: PathPattern,
}

impl PathMatcher {
    pub fn new(pattern: PathPattern) -> Self {
        Self { pattern }
    }
}

impl Matcher for PathMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.pattern.matches_path(req.uri().path())
    }
}

/// Matches the request method exactly.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: String,
}

impl MethodMatcher {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
        }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.method().as_str() == self.method
    }
}

/// Requires a query parameter with an exact value.
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    key: String,
    value: String,
}

impl QueryMatcher {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Matcher for QueryMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        let Some(query) = req.uri().query() else {
            return false;
        };
        url::form_urlencoded::parse(query.as_bytes())
            .any(|(key, value)| key == self.key.as_str() && value == self.value.as_str())
    }
}

/// Requires a header with an exact value.
#[derive(Debug, Clone)]
pub struct HeaderMatcher {
    name: HeaderName,
    value: String,
}

impl HeaderMatcher {
    /// `HeaderName` is already lowercase, which makes the lookup case-insensitive.
    pub fn new(name: HeaderName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

impl Matcher for HeaderMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.headers()
            .get_all(&self.name)
            .iter()
            .any(|v| v.as_bytes() == self.value.as_bytes())
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug, Default)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(req))
    }
}
