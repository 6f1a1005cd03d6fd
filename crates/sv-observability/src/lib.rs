//! # sv-observability
//!
//! Structured logging for Sigview, built on the tracing ecosystem.

pub mod logging;

pub use logging::{init_logging, init_logging_with_config, LoggingConfig};
