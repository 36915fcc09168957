//! Chain stage that short-circuits matched requests with their mock.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::Request;

use crate::http::chain::{HandlerError, Middleware, SharedHandler};
use crate::mock::responder;
use crate::observability::metrics;
use crate::routing::DispatchTable;

/// Serves the first matching mock, otherwise hands the request on.
#[derive(Debug, Clone)]
pub struct MockMiddleware {
    table: Arc<DispatchTable>,
}

impl MockMiddleware {
    pub fn new(table: Arc<DispatchTable>) -> Self {
        Self { table }
    }
}

impl Middleware for MockMiddleware {
    fn wrap(&self, next: SharedHandler) -> SharedHandler {
        let table = self.table.clone();
        Arc::new(move |request: Request<Body>| {
            let table = table.clone();
            let next = next.clone();
            async move {
                let start = Instant::now();
                let Some(rule) = table.match_request(&request).cloned() else {
                    return next.call(request).await;
                };

                tracing::debug!(
                    method = %request.method(),
                    path = %request.uri().path(),
                    pattern = %rule.path,
                    status = rule.response.status.as_u16(),
                    "Serving mock"
                );
                let response = responder::respond_delayed(&rule.response).await;
                metrics::record_request(
                    request.method().as_str(),
                    response.status().as_u16(),
                    metrics::ROUTE_MOCK,
                    start,
                );
                Ok::<_, HandlerError>(response)
            }
        })
    }
}
