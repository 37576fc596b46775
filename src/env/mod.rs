//! Host environment collaborators.
//!
//! The loader consumes these at its boundary:
//! - Document queries for detectors
//! - Global symbol table for published exports
//! - Event bus for load announcements

pub mod document;
pub mod events;
pub mod globals;

pub use document::{Document, Element, Query, ReadyState, StaticDocument};
pub use events::{EventBus, PluginLoadedEvent};
pub use globals::{GlobalScope, GlobalTable};

use std::sync::Arc;

/// The collaborators a loader talks to.
#[derive(Clone)]
pub struct Environment {
    /// Document queried by detectors
    pub document: Arc<dyn Document>,
    /// Global symbol table
    pub globals: Arc<dyn GlobalScope>,
    /// Load completion events
    pub events: Arc<EventBus>,
}

impl Environment {
    /// Create an environment from its parts.
    pub fn new(
        document: Arc<dyn Document>,
        globals: Arc<dyn GlobalScope>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            document,
            globals,
            events,
        }
    }

    /// In-memory environment around the given document.
    pub fn with_document(document: Arc<dyn Document>) -> Self {
        Self::new(
            document,
            Arc::new(GlobalTable::new()),
            Arc::new(EventBus::default()),
        )
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::with_document(Arc::new(StaticDocument::new()))
    }
}
