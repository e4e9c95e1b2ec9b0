//! Command implementations for the CLI
//!
//! - start: Start the demo server
//! - test: Test configuration validity
//! - config: Configuration display
//! - models: List pricing models
//! - calculate: Quote usage offline

pub mod calculate;
pub mod config;
pub mod models;
pub mod start;
