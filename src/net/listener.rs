//! TCP listener binding.
//!
//! # Responsibilities
//! - Resolve the configured host and port
//! - Bind the socket the HTTP server accepts on
//! - Report bind failures with the address that failed

use std::net::SocketAddr;

use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Host/port pair is not a socket address.
    Address(String),
    /// Failed to bind to address.
    Bind(SocketAddr, std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Address(addr) => write!(f, "Invalid listen address: {}", addr),
            ListenerError::Bind(addr, e) => write!(f, "Failed to bind {}: {}", addr, e),
        }
    }
}

impl std::error::Error for ListenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ListenerError::Address(_) => None,
            ListenerError::Bind(_, e) => Some(e),
        }
    }
}

/// Build the socket address for `host` and `port`. IPv6 hosts may be given
/// with or without brackets.
pub fn listen_addr(host: &str, port: u16) -> Result<SocketAddr, ListenerError> {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let joined = if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    };
    joined.parse().map_err(|_| ListenerError::Address(joined))
}

/// Bind a listener on `host:port`.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let addr = listen_addr(host, port)?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ListenerError::Bind(addr, e))?;

    if let Ok(local_addr) = listener.local_addr() {
        tracing::info!(address = %local_addr, "Listener bound");
    }
    Ok(listener)
}
