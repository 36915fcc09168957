//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compose the handler chain (CORS → preflight → mocks → forward)
//! - Create the Axum Router that feeds every request into the chain
//! - Wire up middleware (tracing)
//! - Serve on a bound listener until shutdown is signalled

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::http::chain::{Chain, SharedHandler};
use crate::http::cors::{inject_cors_headers, CorsMiddleware, PreflightMiddleware};
use crate::http::forward::ForwardingHandler;
use crate::mock::MockMiddleware;
use crate::routing::DispatchTable;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: SharedHandler,
}

/// Compose the production handler chain.
pub fn build_pipeline(table: Arc<DispatchTable>, forwarder: ForwardingHandler) -> SharedHandler {
    Chain::new()
        .with(CorsMiddleware)
        .with(PreflightMiddleware)
        .with(MockMiddleware::new(table))
        .then(forwarder)
}

/// HTTP server for one relay session.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server around a composed handler chain.
    pub fn new(pipeline: SharedHandler) -> Self {
        Self {
            router: Self::build_router(AppState { pipeline }),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!(address = %addr, "HTTP server stopped");
        Ok(())
    }
}

/// Feeds every request into the handler chain.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match state.pipeline.call(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(method = %method, path = %path, error = %e, "Handler chain failed");
            let mut response = e.into_response();
            inject_cors_headers(response.headers_mut());
            response
        }
    }
}
