//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, query, headers)
//!     → router.rs (dispatch table lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: matched MockRule or NoMatch
//!
//! Table Compilation (at server start):
//!     MockRule[]
//!     → Partition: discriminated / default
//!     → Compile matchers
//!     → Freeze as immutable DispatchTable
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same rule
//! - First match wins (discriminated group first)

pub mod matcher;
pub mod router;

pub use router::DispatchTable;
