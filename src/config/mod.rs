//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → loader.rs compile_mocks → MockRule[]
//!     → handed to the controller for the session's lifetime
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{compile_mocks, load_config, parse_config, ConfigError};
pub use schema::{
    ListenerConfig, MockConfig, MockResponseConfig, ObservabilityConfig, ProxyConfig,
    ShutdownConfig, UpstreamConfig,
};
pub use validation::ValidationError;
