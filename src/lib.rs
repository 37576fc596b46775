//! # lazyplug - on-demand plugin activation
//!
//! Register named plugins as deferred loader tasks, then load them when
//! needed:
//! - **Scheduler**: dependency-ordered async loading with concurrent-request
//!   deduplication and fixed-delay retry
//! - **Detectors**: document predicates with `any` / `all` combinators
//! - **Auto-detect**: load every plugin whose detector currently matches
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lazyplug::{BoxError, LoaderConfig, Module, PluginDefinition, PluginLoader};
//! use lazyplug::detect::has_class;
//!
//! #[tokio::main]
//! async fn main() -> lazyplug::Result<()> {
//!     let loader = PluginLoader::new(LoaderConfig::default());
//!     loader.register(
//!         "carousel",
//!         PluginDefinition::new()
//!             .with_loader(|| async { Ok::<_, BoxError>(Module::new("carousel v2")) })
//!             .with_detector(has_class(["carousel"])),
//!     )?;
//!
//!     let export = loader.load("carousel").await?;
//!     println!("loaded: {:?}", export.downcast_ref::<&str>());
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod detect;
pub mod env;
pub mod loader;
pub mod monitoring;
pub mod plugin;

pub use crate::core::error::{BoxError, Error, Result, TaskError};
pub use crate::core::types::{Module, PluginExport};
pub use env::Environment;
pub use loader::{create_plugin_loader, LoadReport, LoaderConfig, PluginLoader, PluginStatus};
pub use plugin::PluginDefinition;
