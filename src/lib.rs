//! Local CORS proxy with a mock dispatcher.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod mock;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::{HttpServer, ProxyTarget};
pub use lifecycle::{ControlError, ControllerSettings, ControllerState, ProxyController};
pub use mock::{MockResponse, MockRule};
pub use routing::DispatchTable;
