//! Mock subsystem.
//!
//! # Data Flow
//! ```text
//! MockConfig[] (config file)
//!     → config/loader.rs (compile, read body files)
//!     → types.rs (MockRule, MockResponse)
//!     → routing (dispatch table)
//!     → middleware.rs (chain stage: match or pass on)
//!     → responder.rs (canned response on match)
//! ```
//!
//! # Design Decisions
//! - Mock responses are immutable once loaded
//! - Bodies are served verbatim, no templating

pub mod middleware;
pub mod responder;
pub mod types;

pub use middleware::MockMiddleware;
pub use types::{MockResponse, MockRule};
