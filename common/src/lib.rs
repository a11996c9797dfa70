//! Shared utilities for pg-env components
//!
//! This crate provides the ambient pieces used by the pg-env binary and library:
//! - Structured logging initialization
//! - Environment variable parsing helpers

pub mod config;
pub mod logging;

pub use config::ConfigExt;
pub use logging::init_logging;
