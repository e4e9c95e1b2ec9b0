pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metering;
pub mod metrics;
pub mod pricing;
pub mod server;
pub mod signals;

pub use logging::init_tracing;
