//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Upstream API the relay forwards to.
    pub upstream: UpstreamConfig,

    /// Graceful shutdown settings.
    pub shutdown: ShutdownConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Mock definitions, in declaration order.
    pub mocks: Vec<MockConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Local port to listen on.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8764,
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the remote API. May also be given on the command line.
    pub url: Option<String>,
}

/// Graceful shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long `stop` waits for in-flight requests before aborting.
    pub drain_timeout_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// A single mock definition.
///
/// A mock with a method, query or header constraint is "discriminated" and
/// is always tried before mocks constrained by path alone.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MockConfig {
    /// Path pattern. Empty matches every path.
    pub path: String,

    /// Exact, case-sensitive request method.
    pub method: Option<String>,

    /// Required query parameters.
    pub queries: IndexMap<String, String>,

    /// Required request headers.
    pub headers: IndexMap<String, String>,

    /// Response served when the mock matches.
    pub response: MockResponseConfig,
}

/// Canned response of a mock.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MockResponseConfig {
    /// HTTP status code.
    pub code: u16,

    /// Response headers, written in declaration order.
    pub headers: IndexMap<String, String>,

    /// Inline response body.
    pub body: Option<String>,

    /// File whose contents become the body, relative to the config file.
    pub file: Option<String>,

    /// Delay before the response is written.
    pub delay_ms: Option<u64>,
}

impl Default for MockResponseConfig {
    fn default() -> Self {
        Self {
            code: 200,
            headers: IndexMap::new(),
            body: None,
            file: None,
            delay_ms: None,
        }
    }
}
