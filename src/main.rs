//! cors-relay
//!
//! A local HTTP proxy that adds permissive CORS headers to every response,
//! answers preflights itself, and serves canned responses for configured
//! routes before forwarding everything else to one upstream.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser                 ┌──────────────────────────────────────────────┐
//!     ────────────────────────┼─▶ net::listener ─▶ http::server (axum)       │
//!                             │                       │                      │
//!                             │        ┌──────────────▼──────────────┐       │
//!                             │        │ CORS ─▶ preflight ─▶ mock   │       │
//!                             │        │            │          │    │       │
//!                             │        │     OPTIONS 200   DispatchTable    │
//!                             │        │                       │ miss       │
//!                             │        │              ForwardingHandler ─────┼──▶ Upstream
//!                             │        └─────────────────────────────┘       │
//!                             │                                              │
//!                             │  config · lifecycle · observability          │
//!                             └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::Parser;

use cors_relay::config::{self, ProxyConfig};
use cors_relay::lifecycle::{shutdown, ControllerSettings, ProxyController};
use cors_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "cors-relay")]
#[command(about = "Local CORS proxy with mock responses", long_about = None)]
struct Cli {
    /// Upstream API base URL
    api_url: Option<String>,

    /// Port to listen on [default: 8764]
    #[arg(short, long)]
    port: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (mut proxy_config, base_dir) = match &cli.config {
        Some(path) => (
            config::load_config(path)?,
            path.parent().map(Path::to_path_buf).unwrap_or_default(),
        ),
        None => (ProxyConfig::default(), PathBuf::from(".")),
    };
    if let Some(host) = cli.host {
        proxy_config.listener.host = host;
    }

    logging::init_logging(&proxy_config.observability)?;
    tracing::info!("cors-relay v{} starting", env!("CARGO_PKG_VERSION"));

    let Some(upstream) = cli.api_url.or_else(|| proxy_config.upstream.url.clone()) else {
        tracing::warn!("No upstream URL given on the command line or in the config file");
        return Err("missing upstream API URL".into());
    };
    let port = cli
        .port
        .unwrap_or_else(|| proxy_config.listener.port.to_string());

    if proxy_config.observability.metrics_enabled {
        match proxy_config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %proxy_config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let rules = config::compile_mocks(&proxy_config, &base_dir)?;
    tracing::info!(
        host = %proxy_config.listener.host,
        mocks = rules.len(),
        drain_timeout_secs = proxy_config.shutdown.drain_timeout_secs,
        "Configuration loaded"
    );

    let controller = ProxyController::new(ControllerSettings::from_config(&proxy_config, rules));
    controller.start(&upstream, &port).await?;

    shutdown::ctrl_c().await;
    controller.stop().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
