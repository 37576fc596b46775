//! Global symbol table where loaded exports may be published.

use crate::core::PluginExport;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Write access to the host's global symbol table. Last write wins.
pub trait GlobalScope: Send + Sync {
    /// Publish a value under `name`, replacing any previous value.
    fn publish(&self, name: &str, export: PluginExport);

    /// Remove the value under `name`.
    fn remove(&self, name: &str) -> Option<PluginExport>;

    /// Read the value under `name`.
    fn get(&self, name: &str) -> Option<PluginExport>;
}

/// In-memory global symbol table.
#[derive(Default)]
pub struct GlobalTable {
    symbols: RwLock<HashMap<String, PluginExport>>,
}

impl GlobalTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a name is published.
    pub fn contains(&self, name: &str) -> bool {
        self.symbols
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Published names.
    pub fn names(&self) -> Vec<String> {
        self.symbols
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl GlobalScope for GlobalTable {
    fn publish(&self, name: &str, export: PluginExport) {
        self.symbols
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), export);
    }

    fn remove(&self, name: &str) -> Option<PluginExport> {
        self.symbols
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    fn get(&self, name: &str) -> Option<PluginExport> {
        self.symbols
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}
