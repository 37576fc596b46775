//! Document query facility.
//!
//! Detectors never touch the host directly: they ask a [`Document`] whether
//! something matching a [`Query`] exists. Hosts that only understand CSS
//! selectors can use the `Display` rendering of a query.

use crate::core::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tokio::sync::watch;

/// An existence query against the document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Query {
    /// Any element carrying one of the classes
    Class(Vec<String>),
    /// Any element with one of the ids
    Id(Vec<String>),
    /// Any element with a `data-<name>` attribute
    DataAttribute(String),
    /// Any element whose attribute value contains a substring
    AttributeContains { attribute: String, value: String },
    /// Arbitrary selector string
    Selector(String),
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::Class(classes) => {
                let parts: Vec<String> = classes.iter().map(|c| format!(".{}", c)).collect();
                write!(f, "{}", parts.join(", "))
            }
            Query::Id(ids) => {
                let parts: Vec<String> = ids.iter().map(|id| format!("#{}", id)).collect();
                write!(f, "{}", parts.join(", "))
            }
            Query::DataAttribute(name) => write!(f, "[data-{}]", name),
            Query::AttributeContains { attribute, value } => {
                write!(f, "[{}*=\"{}\"]", attribute, value)
            }
            Query::Selector(selector) => write!(f, "{}", selector),
        }
    }
}

/// Document loading progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadyState {
    /// Still parsing
    Loading,
    /// Parsed, subresources pending
    Interactive,
    /// Fully loaded
    Complete,
}

impl ReadyState {
    /// Anything past `Loading` counts as ready.
    pub fn is_ready(&self) -> bool {
        !matches!(self, ReadyState::Loading)
    }
}

/// Read-only view of the host document.
#[async_trait]
pub trait Document: Send + Sync {
    /// Whether at least one element matches the query.
    fn query(&self, query: &Query) -> Result<bool>;

    /// Current ready state.
    fn ready_state(&self) -> ReadyState {
        ReadyState::Complete
    }

    /// Resolve once the document is ready.
    async fn wait_ready(&self) {}
}

/// An element of a [`StaticDocument`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Element id
    pub id: Option<String>,
    /// Class list
    pub classes: Vec<String>,
    /// Attributes (including `data-*` and `onclick`)
    pub attributes: HashMap<String, String>,
}

impl Element {
    /// Create an empty element.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set id.
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Add class.
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Set attribute.
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn has_id(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }

    fn matches(&self, query: &Query) -> Result<bool> {
        Ok(match query {
            Query::Class(classes) => classes.iter().any(|c| self.has_class(c)),
            Query::Id(ids) => ids.iter().any(|id| self.has_id(id)),
            Query::DataAttribute(name) => self.attributes.contains_key(&format!("data-{}", name)),
            Query::AttributeContains { attribute, value } => self
                .attributes
                .get(attribute)
                .is_some_and(|v| v.contains(value.as_str())),
            Query::Selector(selector) => {
                for part in selector.split(',').map(str::trim) {
                    if self.matches_simple(part)? {
                        return Ok(true);
                    }
                }
                false
            }
        })
    }

    /// `.class`, `#id` or `[attribute]`; nothing compound.
    fn matches_simple(&self, selector: &str) -> Result<bool> {
        let unsupported = || Error::UnsupportedSelector(selector.to_string());
        let is_ident = |s: &str| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };

        if let Some(class) = selector.strip_prefix('.') {
            if is_ident(class) {
                return Ok(self.has_class(class));
            }
        } else if let Some(id) = selector.strip_prefix('#') {
            if is_ident(id) {
                return Ok(self.has_id(id));
            }
        } else if let Some(attr) = selector
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
        {
            if is_ident(attr) {
                return Ok(self.attributes.contains_key(attr));
            }
        }
        Err(unsupported())
    }
}

/// In-memory document.
///
/// Answers structured queries and single-token selectors (`.c`, `#i`,
/// `[attr]`, comma-separated); other selectors fail with
/// [`Error::UnsupportedSelector`].
pub struct StaticDocument {
    elements: RwLock<Vec<Element>>,
    ready: watch::Sender<ReadyState>,
}

impl StaticDocument {
    /// Create an empty, already complete document.
    pub fn new() -> Self {
        Self::with_state(ReadyState::Complete)
    }

    /// Create an empty document that is still loading.
    pub fn loading() -> Self {
        Self::with_state(ReadyState::Loading)
    }

    fn with_state(state: ReadyState) -> Self {
        let (ready, _) = watch::channel(state);
        Self {
            elements: RwLock::new(Vec::new()),
            ready,
        }
    }

    /// Add elements (builder style).
    pub fn with_elements(self, elements: impl IntoIterator<Item = Element>) -> Self {
        for element in elements {
            self.insert(element);
        }
        self
    }

    /// Add an element.
    pub fn insert(&self, element: Element) {
        self.elements
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(element);
    }

    /// Remove all elements.
    pub fn clear(&self) {
        self.elements
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Advance the ready state, waking anyone in `wait_ready`.
    pub fn set_ready_state(&self, state: ReadyState) {
        self.ready.send_replace(state);
    }

    /// Element count.
    pub fn len(&self) -> usize {
        self.elements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the document has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StaticDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Document for StaticDocument {
    fn query(&self, query: &Query) -> Result<bool> {
        let elements = self.elements.read().unwrap_or_else(PoisonError::into_inner);
        for element in elements.iter() {
            if element.matches(query)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn ready_state(&self) -> ReadyState {
        *self.ready.borrow()
    }

    async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        // Sender lives in self, so the channel cannot close while we wait.
        let _ = rx.wait_for(ReadyState::is_ready).await;
    }
}
