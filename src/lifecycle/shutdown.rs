//! Shutdown coordination.

use tokio::sync::broadcast;

/// Stop signal for one serving session.
///
/// Receivers subscribed before `fire` observe the signal even if they start
/// waiting afterwards.
#[derive(Debug)]
pub struct ShutdownSignal {
    tx: broadcast::Sender<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the signal. Returns false when nobody was listening.
    pub fn fire(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for Ctrl+C. Logs and returns immediately if the handler cannot be
/// installed.
pub async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Interrupt received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}
