//! # Vantage Utilities
//!
//! Shared utilities, logging, and helpers for Vantage.
//!
//! This crate provides common functionality used across the Vantage workspace,
//! most notably the logging bootstrap built on `tracing`.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_for_tui, init_logging_with_level, LogFormat, LogLevel};
pub use tracing::{debug, error, info, trace, warn};
