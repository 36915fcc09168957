//! Mock rule lookup and dispatch.
//!
//! # Responsibilities
//! - Compile mock rules into matchers
//! - Partition rules into discriminated and default groups
//! - Look up the matching rule for a request
//! - Return matched rule or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Discriminated rules are always tried before default rules
//! - Declaration order is preserved inside each group; first match wins
//! - No match is not an error: the caller forwards upstream

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;

use crate::mock::MockRule;
use crate::routing::matcher::{
    AndMatcher, HeaderMatcher, Matcher, MethodMatcher, PathMatcher, QueryMatcher,
};

/// A rule together with its compiled matcher.
#[derive(Debug)]
struct Route {
    rule: Arc<MockRule>,
    matcher: AndMatcher,
}

impl Route {
    fn compile(rule: MockRule) -> Self {
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();

        // Empty path is omitted from the route entirely
        if !rule.path.is_any() {
            matchers.push(Box::new(PathMatcher::new(rule.path.clone())));
        }
        if let Some(method) = &rule.method {
            matchers.push(Box::new(MethodMatcher::new(method.clone())));
        }
        for (key, value) in &rule.queries {
            matchers.push(Box::new(QueryMatcher::new(key.clone(), value.clone())));
        }
        for (name, value) in &rule.headers {
            matchers.push(Box::new(HeaderMatcher::new(name.clone(), value.clone())));
        }

        Self {
            rule: Arc::new(rule),
            matcher: AndMatcher::new(matchers),
        }
    }
}

/// Ordered dispatch table built from a rule set.
#[derive(Debug, Default)]
pub struct DispatchTable {
    discriminated: Vec<Route>,
    defaults: Vec<Route>,
}

impl DispatchTable {
    /// Build the table, partitioning rules by whether they carry method,
    /// query or header constraints.
    pub fn build(rules: impl IntoIterator<Item = MockRule>) -> Self {
        let mut table = Self::default();
        for rule in rules {
            if rule.is_discriminated() {
                table.discriminated.push(Route::compile(rule));
            } else {
                table.defaults.push(Route::compile(rule));
            }
        }

        let global_defaults = table
            .defaults
            .iter()
            .filter(|route| route.rule.is_global_default())
            .count();
        if global_defaults > 1 {
            tracing::warn!(
                count = global_defaults,
                "Multiple catch-all mocks configured; only the first declared one can ever match"
            );
        }

        tracing::debug!(
            discriminated = table.discriminated.len(),
            defaults = table.defaults.len(),
            "Mock dispatch table built"
        );
        table
    }

    /// Find the first rule matching the request.
    pub fn match_request(&self, req: &Request<Body>) -> Option<&Arc<MockRule>> {
        self.discriminated
            .iter()
            .chain(self.defaults.iter())
            .find(|route| route.matcher.matches(req))
            .map(|route| &route.rule)
    }

    /// Total number of rules in the table.
    pub fn len(&self) -> usize {
        self.discriminated.len() + self.defaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
