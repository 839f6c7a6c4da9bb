//! System orchestration, configuration, startup, and shutdown logic.

pub mod config;
pub mod stock_system;
pub mod telemetry;

pub use self::config::*;
pub use stock_system::*;
pub use telemetry::*;
