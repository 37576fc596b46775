//! Plugin definitions.
//!
//! A [`PluginDefinition`] is what callers hand to `register`; once validated
//! it becomes a [`Plugin`], which always carries a loader task.

use crate::core::{now, BoxError, Error, Module, PluginExport, Result, Timestamp};
use crate::detect::Detector;
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;

/// Version assumed when none is given.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Deferred import producing the plugin's module.
pub type LoaderFn =
    dyn Fn() -> BoxFuture<'static, std::result::Result<Module, BoxError>> + Send + Sync;

/// Called with the resolved export after a successful load.
pub type OnLoadFn = dyn Fn(&PluginExport) -> std::result::Result<(), BoxError> + Send + Sync;

/// Called with the error of a failed load or a failed `on_load`.
pub type OnErrorFn = dyn Fn(&Error) + Send + Sync;

/// Plugin definition (builder).
#[derive(Clone)]
pub struct PluginDefinition {
    loader: Option<Arc<LoaderFn>>,
    detector: Option<Detector>,
    global: Option<String>,
    on_load: Option<Arc<OnLoadFn>>,
    on_error: Option<Arc<OnErrorFn>>,
    dependencies: Vec<String>,
    version: String,
    description: String,
}

impl PluginDefinition {
    /// Create an empty definition. A loader must be set before registering.
    pub fn new() -> Self {
        Self {
            loader: None,
            detector: None,
            global: None,
            on_load: None,
            on_error: None,
            dependencies: Vec::new(),
            version: DEFAULT_VERSION.to_string(),
            description: String::new(),
        }
    }

    /// Set the loader task factory.
    pub fn with_loader<F, Fut, E>(mut self, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Module, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        self.loader = Some(Arc::new(move || {
            loader()
                .map(|result| result.map_err(Into::<BoxError>::into))
                .boxed()
        }));
        self
    }

    /// Set the auto-activation detector.
    pub fn with_detector(mut self, detector: Detector) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Publish the export under this global name.
    pub fn with_global(mut self, name: &str) -> Self {
        self.global = Some(name.to_string());
        self
    }

    /// Set the load callback.
    pub fn on_load<F, E>(mut self, callback: F) -> Self
    where
        F: Fn(&PluginExport) -> std::result::Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.on_load = Some(Arc::new(move |export: &PluginExport| {
            callback(export).map_err(Into::<BoxError>::into)
        }));
        self
    }

    /// Set the error callback.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Add dependency.
    pub fn with_dependency(mut self, dep: &str) -> Self {
        self.dependencies.push(dep.to_string());
        self
    }

    /// Add dependencies.
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Set version.
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Set description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    /// Check if a loader is set.
    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }
}

impl Default for PluginDefinition {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered plugin.
#[derive(Clone)]
pub struct Plugin {
    /// Plugin name
    pub name: String,
    /// Auto-activation detector
    pub detector: Option<Detector>,
    /// Global export name
    pub global: Option<String>,
    /// Plugins that must load first
    pub dependencies: Vec<String>,
    /// Version (metadata only)
    pub version: String,
    /// Description (metadata only)
    pub description: String,
    /// Registration time
    pub registered_at: Timestamp,
    loader: Arc<LoaderFn>,
    on_load: Option<Arc<OnLoadFn>>,
    on_error: Option<Arc<OnErrorFn>>,
}

impl Plugin {
    /// Validate a definition.
    pub fn from_definition(name: &str, definition: PluginDefinition) -> Result<Self> {
        let loader = definition.loader.ok_or_else(|| {
            Error::Configuration(format!("Plugin '{}' requires a loader", name))
        })?;

        Ok(Self {
            name: name.to_string(),
            detector: definition.detector,
            global: definition.global,
            dependencies: definition.dependencies,
            version: definition.version,
            description: definition.description,
            registered_at: now(),
            loader,
            on_load: definition.on_load,
            on_error: definition.on_error,
        })
    }

    /// Start one loader attempt.
    pub fn run_loader(&self) -> BoxFuture<'static, std::result::Result<Module, BoxError>> {
        (self.loader)()
    }

    /// Invoke `on_load`, if any.
    pub fn notify_loaded(&self, export: &PluginExport) -> std::result::Result<(), BoxError> {
        match &self.on_load {
            Some(callback) => callback(export),
            None => Ok(()),
        }
    }

    /// Invoke `on_error`, if any.
    pub fn notify_error(&self, error: &Error) {
        if let Some(callback) = &self.on_error {
            callback(error);
        }
    }

    /// Check if a detector is set.
    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("global", &self.global)
            .field("dependencies", &self.dependencies)
            .field("version", &self.version)
            .field("has_detector", &self.has_detector())
            .finish()
    }
}
