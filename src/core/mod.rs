//! Core utilities and common types for lazyplug.

pub mod error;
pub mod types;

pub use error::{BoxError, Error, Result, TaskError};
pub use types::*;
