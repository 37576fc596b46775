//! Common types used across lazyplug modules.

use std::any::Any;
use std::sync::Arc;

/// The value a plugin resolves to once loaded.
///
/// Type-erased and cheaply cloneable; the same export is handed to every
/// caller, to `on_load`, to the global symbol table and to the event bus.
#[derive(Clone)]
pub struct PluginExport(Arc<dyn Any + Send + Sync>);

impl PluginExport {
    /// Wrap a value as an export.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the export as a concrete type.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Get a shared handle to the export as a concrete type.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.0.clone().downcast::<T>().ok()
    }

    /// Check whether the export holds a value of type `T`.
    pub fn is<T: Any + Send + Sync>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Whether both handles point at the same underlying value.
    pub fn ptr_eq(&self, other: &PluginExport) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for PluginExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PluginExport")
            .field(&format_args!("{:p}", Arc::as_ptr(&self.0)))
            .finish()
    }
}

/// What a loader task produces.
///
/// A module may carry a `default` slot next to its namespace; when present,
/// the default is what the plugin resolves to.
#[derive(Clone, Debug)]
pub struct Module {
    namespace: PluginExport,
    default: Option<PluginExport>,
}

impl Module {
    /// A module whose namespace is the export.
    pub fn new<T: Any + Send + Sync>(namespace: T) -> Self {
        Self {
            namespace: PluginExport::new(namespace),
            default: None,
        }
    }

    /// A module exposing only a default value.
    pub fn from_default<T: Any + Send + Sync>(value: T) -> Self {
        Self::new(()).with_default(value)
    }

    /// Set the default slot.
    pub fn with_default<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.default = Some(PluginExport::new(value));
        self
    }

    /// Check if the module has a default slot.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Resolve the export: the default slot if present, otherwise the namespace.
    pub fn into_export(self) -> PluginExport {
        self.default.unwrap_or(self.namespace)
    }
}

impl From<PluginExport> for Module {
    fn from(namespace: PluginExport) -> Self {
        Self {
            namespace,
            default: None,
        }
    }
}

/// Timestamp wrapper for consistent serialization.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Get current UTC timestamp.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}
