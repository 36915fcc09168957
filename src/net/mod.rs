//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Controller start
//!     → listener.rs (resolve address, bind)
//!     → Hand off to HTTP layer (axum accept loop)
//! ```
//!
//! # Design Decisions
//! - Bind happens before the session is marked running
//! - Bind failures are returned to the caller, never retried

pub mod listener;
