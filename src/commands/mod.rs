//! Command implementations for the CLI
//!
//! - start: load artifacts and serve the web UI
//! - test: check configuration and artifacts
//! - config: configuration display and validation

pub mod config;
pub mod start;
