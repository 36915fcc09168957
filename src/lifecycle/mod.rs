//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Start (controller.rs):
//!     Parse upstream → Parse port → Bind → Build chain → Spawn server task
//!
//! Stop (controller.rs + shutdown.rs):
//!     Fire signal → Stop accepting → Drain connections → Idle
//! ```
//!
//! # Design Decisions
//! - Fail fast: any start error leaves the controller idle
//! - Stop has a deadline: serving task aborted after drain timeout

pub mod controller;
pub mod shutdown;

pub use controller::{ControlError, ControllerSettings, ControllerState, ProxyController};
pub use shutdown::ShutdownSignal;
