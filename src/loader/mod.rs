//! Loader Module
//!
//! The active core:
//! - Load scheduler (dependencies, dedup, retry, publish)
//! - Auto-detect pass
//! - Startup wiring

/// `debug!` gated on the loader's `debug` flag.
macro_rules! diag {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            ::tracing::debug!($($arg)+);
        }
    };
}

pub mod auto_detect;
pub mod bootstrap;
pub mod config;
pub mod retry;
pub mod scheduler;

pub use config::LoaderConfig;
pub use retry::{RetryOutcome, RetryPolicy};
pub use scheduler::{FailedLoad, LoadFuture, LoadReport, PluginLoader, PluginStatus};

use crate::env::Environment;

/// Create a loader with its own registry and state.
pub fn create_plugin_loader(config: LoaderConfig, env: Environment) -> PluginLoader {
    PluginLoader::with_environment(config, env)
}
