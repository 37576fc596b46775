//! Monitoring Module
//!
//! Logging setup for hosts embedding the loader.

pub mod logging;

pub use logging::{init_tracing, LogFormat, LoggerConfig};
