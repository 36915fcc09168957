//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, fallback handler)
//!     → chain.rs (ordered middleware)
//!         → cors.rs (inject CORS headers, answer OPTIONS)
//!         → mock dispatch (routing + mock responder)
//!         → forward.rs (target.rs rewrite, headers.rs filter, upstream call)
//!     → Send to client
//! ```

pub mod chain;
pub mod cors;
pub mod forward;
pub mod headers;
pub mod server;
pub mod target;

pub use chain::{Chain, Handler, HandlerError, HandlerResult, Middleware, SharedHandler};
pub use forward::ForwardingHandler;
pub use server::HttpServer;
pub use target::ProxyTarget;
