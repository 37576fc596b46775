//! Error types for lazyplug.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for lazyplug operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by loader tasks, callbacks and custom detectors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while registering, detecting or loading plugins.
///
/// Cloneable because a single load failure is delivered to every caller
/// joined on the same in-flight load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Registration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Load errors
    #[error("Plugin '{0}' not found")]
    PluginNotFound(String),

    #[error("Plugin '{name}' failed to load after {attempts} attempt(s): {source}")]
    LoadFailed {
        name: String,
        attempts: u32,
        #[source]
        source: TaskError,
    },

    #[error("Cyclic dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    #[error("onLoad callback of '{name}' failed: {message}")]
    CallbackFailed { name: String, message: String },

    // Detection errors
    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("Unsupported selector: {0}")]
    UnsupportedSelector(String),

    // Runtime errors
    #[error("No Tokio runtime to drive the load: {0}")]
    Runtime(String),
}

impl Error {
    /// Name of the plugin this error is about, if any.
    pub fn plugin(&self) -> Option<&str> {
        match self {
            Error::PluginNotFound(name) => Some(name),
            Error::LoadFailed { name, .. } | Error::CallbackFailed { name, .. } => Some(name),
            Error::CyclicDependency(path) => path.first().map(String::as_str),
            _ => None,
        }
    }
}

/// Shared, cloneable handle to the error a loader task failed with.
///
/// Compares by message so [`Error`] stays `PartialEq`.
#[derive(Clone)]
pub struct TaskError(Arc<dyn std::error::Error + Send + Sync>);

impl TaskError {
    /// Downcast to the concrete error the loader task returned.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

impl From<BoxError> for TaskError {
    fn from(err: BoxError) -> Self {
        Self(Arc::from(err))
    }
}

impl fmt::Debug for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for TaskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl PartialEq for TaskError {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.to_string() == other.to_string()
    }
}

impl Eq for TaskError {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Configuration(err.to_string())
    }
}
