//! Handler chaining.
//!
//! A request flows through an ordered list of middleware. Each middleware is
//! given the next stage when the chain is composed and decides whether to
//! call it. A stage that never calls `next` terminates the chain.
//!
//! ```text
//! Chain::new().with(a).with(b).then(terminal)
//!     = a.wrap(b.wrap(terminal))
//! ```

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

/// Failure reported by a handler to its caller.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

pub type HandlerResult = Result<Response, HandlerError>;

/// A request handler stage.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, HandlerResult>;
}

/// Shared, type-erased handler.
pub type SharedHandler = Arc<dyn Handler>;

impl<F, Fut> Handler for F
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(request))
    }
}

/// Wraps the next stage of a chain.
pub trait Middleware: Send + Sync {
    fn wrap(&self, next: SharedHandler) -> SharedHandler;
}

impl<F> Middleware for F
where
    F: Fn(SharedHandler) -> SharedHandler + Send + Sync,
{
    fn wrap(&self, next: SharedHandler) -> SharedHandler {
        self(next)
    }
}

/// Ordered list of middleware, composed once at configuration time.
#[derive(Default)]
pub struct Chain {
    stages: Vec<Box<dyn Middleware>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware. Stages added first run first.
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.stages.push(Box::new(middleware));
        self
    }

    /// Compose the chain around a terminal handler.
    pub fn then(self, terminal: impl Handler) -> SharedHandler {
        self.stages
            .iter()
            .rev()
            .fold(Arc::new(terminal) as SharedHandler, |next, stage| {
                stage.wrap(next)
            })
    }
}
