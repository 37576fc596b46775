//! Plugin Module
//!
//! Provides the plugin data model:
//! - Plugin definitions and their lifecycle hooks
//! - Plugin registry

pub mod definition;
pub mod registry;

pub use definition::{Plugin, PluginDefinition, DEFAULT_VERSION};
pub use registry::{find_cycle, PluginRegistry};
