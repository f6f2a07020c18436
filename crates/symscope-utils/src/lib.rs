//! # symscope utilities
//!
//! Logging setup shared by the symscope crates.
//!
//! The core library only emits `tracing` events; binaries call
//! [`init_logging`] (or [`init_logging_with`]) once at startup to decide where
//! they go.

pub mod logging;

// Re-export commonly used logging items for convenience
pub use logging::{init_logging, init_logging_with, LogConfig, LogFormat, LogLevel, LoggingError, LoggingGuard};
pub use tracing::{debug, error, info, trace, warn};
