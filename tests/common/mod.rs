//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, Response, StatusCode, Uri};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Router;
use tokio::net::TcpListener;

use cors_relay::http::{Handler, HandlerError, Middleware, SharedHandler};
use cors_relay::{ControllerSettings, MockRule, ProxyController};

/// A request as the upstream saw it.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A recording upstream answering every request with the same response.
#[derive(Clone)]
pub struct Upstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[allow(dead_code)]
impl Upstream {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Body bytes returned by [`start_upstream`]; not valid UTF-8.
#[allow(dead_code)]
pub const UPSTREAM_BODY: &[u8] = &[0x7b, 0x00, 0xff, 0xfe, 0x7d];

/// Start an upstream that answers `201` with two `x-upstream` values,
/// a `content-type` and [`UPSTREAM_BODY`].
pub async fn start_upstream() -> Upstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();

    let recorded = requests.clone();
    let app = Router::new().fallback(move |request: Request<Body>| {
        let recorded = recorded.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
            recorded.lock().unwrap().push(RecordedRequest {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body,
            });
            (
                StatusCode::CREATED,
                AppendHeaders([
                    ("x-upstream", "one"),
                    ("x-upstream", "two"),
                    ("content-type", "application/octet-stream"),
                ]),
                UPSTREAM_BODY,
            )
                .into_response()
        }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Upstream { addr, requests }
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Start a relay on an ephemeral loopback port.
#[allow(dead_code)]
pub async fn start_relay(upstream_url: &str, rules: Vec<MockRule>) -> (ProxyController, SocketAddr) {
    let controller = ProxyController::new(ControllerSettings {
        host: "127.0.0.1".into(),
        drain_timeout: Duration::from_secs(5),
        rules,
    });
    controller.start(upstream_url, "0").await.unwrap();
    let addr = controller.local_addr().await.unwrap();
    (controller, addr)
}

/// Client that never goes through an environment proxy.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Records the order in which middleware stages run.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct MiddlewareTracker {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

#[allow(dead_code)]
impl MiddlewareTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stage that records `name` and passes the request on.
    pub fn make_middleware(&self, name: &'static str) -> impl Middleware {
        let calls = self.calls.clone();
        move |next: SharedHandler| -> SharedHandler {
            let calls = calls.clone();
            Arc::new(move |request: Request<Body>| {
                calls.lock().unwrap().push(name);
                next.call(request)
            })
        }
    }

    /// A stage that records `name` and answers `200` without calling next.
    pub fn make_final_middleware(&self, name: &'static str) -> impl Middleware {
        let calls = self.calls.clone();
        move |_next: SharedHandler| -> SharedHandler {
            let calls = calls.clone();
            Arc::new(move |_request: Request<Body>| {
                calls.lock().unwrap().push(name);
                async { Ok::<_, HandlerError>(Response::new(Body::empty())) }
            })
        }
    }

    pub fn calls_order(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}
