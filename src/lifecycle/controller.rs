//! Proxy server controller.
//!
//! # State Machine
//! ```text
//! Idle → Starting → Running → Stopping → Idle
//!                      │
//!                      └── listener exits on its own → Idle
//! ```
//!
//! # Design Decisions
//! - At most one session is live; `start` while running and `stop` while
//!   idle are no-ops
//! - `start` and `stop` serialize on one async mutex, held across bind and
//!   drain, so concurrent callers can never leave two listeners or a
//!   dangling one
//! - The serving task never takes that mutex; it only clears the status
//!   when it still owns the current session id
//! - Mock rules and upstream target are frozen for the session's lifetime

use std::net::SocketAddr;
use std::num::ParseIntError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

use crate::config::ProxyConfig;
use crate::http::forward::{build_client, ClientError, ForwardingHandler};
use crate::http::server::{build_pipeline, HttpServer};
use crate::http::target::{ProxyTarget, TargetError};
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::mock::MockRule;
use crate::net::listener::{self, ListenerError};
use crate::routing::DispatchTable;

/// Error returned by [`ProxyController::start`].
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error(transparent)]
    InvalidUpstream(#[from] TargetError),
    #[error("invalid port {port:?}: {source}")]
    InvalidPort { port: String, source: ParseIntError },
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Bind(#[from] ListenerError),
    #[error("failed to read bound address: {0}")]
    LocalAddr(std::io::Error),
}

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Starting,
    Running,
    Stopping,
}

/// Settings shared by every session the controller starts.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Interface to bind.
    pub host: String,
    /// Upper bound on graceful drain during `stop`.
    pub drain_timeout: Duration,
    /// Mock rules in declaration order.
    pub rules: Vec<MockRule>,
}

impl ControllerSettings {
    pub fn from_config(config: &ProxyConfig, rules: Vec<MockRule>) -> Self {
        Self {
            host: config.listener.host.clone(),
            drain_timeout: Duration::from_secs(config.shutdown.drain_timeout_secs),
            rules,
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            drain_timeout: Duration::from_secs(30),
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Status {
    state: ControllerState,
    session: Option<u64>,
}

/// A live listener and the task serving it.
struct ServerSession {
    id: u64,
    local_addr: SocketAddr,
    target: Arc<ProxyTarget>,
    shutdown: ShutdownSignal,
    task: JoinHandle<()>,
}

/// Owns the listener lifecycle. `start` and `stop` are safe to call
/// repeatedly and concurrently.
pub struct ProxyController {
    host: String,
    drain_timeout: Duration,
    table: Arc<DispatchTable>,
    session: AsyncMutex<Option<ServerSession>>,
    status: Arc<Mutex<Status>>,
    next_session: AtomicU64,
}

impl ProxyController {
    pub fn new(settings: ControllerSettings) -> Self {
        let table = DispatchTable::build(settings.rules);
        if table.is_empty() {
            tracing::info!("No mocks configured; every request is forwarded");
        }
        Self {
            host: settings.host,
            drain_timeout: settings.drain_timeout,
            table: Arc::new(table),
            session: AsyncMutex::new(None),
            status: Arc::default(),
            next_session: AtomicU64::new(1),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ControllerState {
        lock(&self.status).state
    }

    pub fn is_running(&self) -> bool {
        self.state() == ControllerState::Running
    }

    /// Address of the running listener.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        if !self.is_running() {
            return None;
        }
        self.session.lock().await.as_ref().map(|s| s.local_addr)
    }

    /// Start serving on `port`, forwarding to `upstream_url`.
    ///
    /// Does nothing when already running. On error the controller stays idle.
    pub async fn start(&self, upstream_url: &str, port: &str) -> Result<(), ControlError> {
        let mut slot = self.session.lock().await;
        if self.is_running() {
            tracing::debug!("Start requested while running; ignoring");
            return Ok(());
        }
        if let Some(stale) = slot.take() {
            tracing::debug!(session = stale.id, "Discarding exited session");
        }

        self.set_status(ControllerState::Starting, None);
        match self.launch(upstream_url, port).await {
            Ok(session) => {
                tracing::info!(
                    session = session.id,
                    address = %session.local_addr,
                    upstream = %session.target,
                    rules = self.table.len(),
                    "Server is running"
                );
                *slot = Some(session);
                Ok(())
            }
            Err(e) => {
                self.set_status(ControllerState::Idle, None);
                tracing::error!(upstream = %upstream_url, port = %port, error = %e, "Failed to start server");
                Err(e)
            }
        }
    }

    async fn launch(&self, upstream_url: &str, port: &str) -> Result<ServerSession, ControlError> {
        let target = Arc::new(ProxyTarget::parse(upstream_url)?);
        let port_number: u16 = port.trim().parse().map_err(|source| ControlError::InvalidPort {
            port: port.to_string(),
            source,
        })?;

        let client = build_client()?;

        let listener = listener::bind(&self.host, port_number).await?;
        let local_addr = listener.local_addr().map_err(ControlError::LocalAddr)?;

        let forwarder = ForwardingHandler::new(target.clone(), client);
        let server = HttpServer::new(build_pipeline(self.table.clone(), forwarder));

        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        let shutdown = ShutdownSignal::new();
        let stop_rx = shutdown.subscribe();

        // Running before the task exists, so an immediate exit is observed
        self.set_status(ControllerState::Running, Some(id));

        let status = self.status.clone();
        let task = tokio::spawn(async move {
            if let Err(e) = server.run(listener, stop_rx).await {
                tracing::error!(session = id, error = %e, "Listener terminated unexpectedly");
            }
            if release_session(&status, id) {
                tracing::warn!(session = id, "Listener exited; server marked as stopped");
            }
        });

        Ok(ServerSession {
            id,
            local_addr,
            target,
            shutdown,
            task,
        })
    }

    /// Stop the running server, waiting up to the drain timeout for in-flight
    /// requests. Does nothing when not running.
    pub async fn stop(&self) {
        let mut slot = self.session.lock().await;
        let Some(session) = slot.take() else {
            tracing::debug!("Stop requested while idle; ignoring");
            return;
        };
        if !self.is_running() {
            tracing::debug!(session = session.id, "Listener already exited");
            return;
        }

        self.set_status(ControllerState::Stopping, Some(session.id));
        tracing::info!(session = session.id, address = %session.local_addr, "Stopping server");

        session.shutdown.fire();
        let mut task = session.task;
        match tokio::time::timeout(self.drain_timeout, &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(session = session.id, error = %e, "Server task failed"),
            Err(_) => {
                // Only the accept loop is cancelled; open connections finish on their own
                tracing::warn!(
                    session = session.id,
                    timeout_ms = self.drain_timeout.as_millis() as u64,
                    "Drain deadline exceeded; stopped waiting for in-flight requests"
                );
                task.abort();
            }
        }

        self.set_status(ControllerState::Idle, None);
        tracing::info!(session = session.id, "Server stopped");
    }

    fn set_status(&self, state: ControllerState, session: Option<u64>) {
        let mut status = lock(&self.status);
        status.state = state;
        status.session = session;
    }
}

impl Drop for ProxyController {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            session.shutdown.fire();
        }
    }
}

/// Move a running session to idle, unless `stop` or a newer session owns
/// the status. Returns true when the status changed.
fn release_session(status: &Mutex<Status>, id: u64) -> bool {
    let mut status = lock(status);
    if status.session == Some(id) && status.state == ControllerState::Running {
        status.state = ControllerState::Idle;
        status.session = None;
        return true;
    }
    false
}

fn lock(status: &Mutex<Status>) -> MutexGuard<'_, Status> {
    status.lock().unwrap_or_else(PoisonError::into_inner)
}
