//! Shared utilities for the tribunal court.

pub mod logging;

pub use logging::{init_logging, try_init_logging, LogFormat, LoggingError};
