//! Load scheduler.
//!
//! Resolves a plugin's dependencies, runs its loader task under the retry
//! policy and publishes the result. Concurrent requests for the same name
//! join one shared in-flight task; the in-flight table is updated before
//! the first suspension point so two callers can never both start a load.

use crate::core::{now, BoxError, Error, PluginExport, Result, Timestamp};
use crate::detect::Detector;
use crate::env::{Environment, PluginLoadedEvent};
use crate::loader::config::LoaderConfig;
use crate::loader::retry::{RetryOutcome, RetryPolicy};
use crate::plugin::{find_cycle, Plugin, PluginDefinition, PluginRegistry};
use futures::future::{self, join_all, BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};
use tracing::warn;

/// Future returned by [`PluginLoader::load`].
pub type LoadFuture = BoxFuture<'static, Result<PluginExport>>;

/// Snapshot of one plugin's state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginStatus {
    /// Export is cached
    pub loaded: bool,
    /// A load is in flight
    pub loading: bool,
    /// Plugin can auto-activate
    pub has_detector: bool,
    /// Declared version
    pub version: String,
    /// When the cached export was produced
    pub loaded_at: Option<Timestamp>,
}

/// A plugin that failed in a bulk load.
#[derive(Clone, Debug)]
pub struct FailedLoad {
    /// Plugin name
    pub name: String,
    /// Why it failed
    pub error: Error,
}

/// Result of [`PluginLoader::load_multiple`].
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Names that loaded
    pub successful: Vec<String>,
    /// Names that failed, with their errors
    pub failed: Vec<FailedLoad>,
    /// Every outcome, in request order
    pub results: Vec<(String, Result<PluginExport>)>,
}

impl LoadReport {
    /// Check if every requested plugin loaded.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

struct InFlight {
    id: u64,
    /// Dependencies the running task resolves, fixed when it started
    dependencies: Vec<String>,
    task: Shared<LoadFuture>,
}

struct Loaded {
    export: PluginExport,
    loaded_at: Timestamp,
}

#[derive(Default)]
struct LoadState {
    loading: HashMap<String, InFlight>,
    loaded: HashMap<String, Loaded>,
    next_id: u64,
}

impl LoadState {
    /// Clear an in-flight entry, unless a newer load has replaced it.
    fn finish(&mut self, name: &str, id: u64) {
        if self.loading.get(name).is_some_and(|f| f.id == id) {
            self.loading.remove(name);
        }
    }
}

struct LoaderContext {
    config: LoaderConfig,
    env: Environment,
    registry: RwLock<PluginRegistry>,
    state: Mutex<LoadState>,
}

impl LoaderContext {
    // Lock order: state before registry.
    fn state(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry(&self) -> RwLockReadGuard<'_, PluginRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// The value under the plugin's global name, falling back to `export`.
    fn published_or(&self, global: Option<&str>, export: PluginExport) -> PluginExport {
        global
            .and_then(|name| self.env.globals.get(name))
            .unwrap_or(export)
    }
}

/// On-demand plugin loader.
///
/// Cheap to clone; clones share the registry and load state.
#[derive(Clone)]
pub struct PluginLoader {
    ctx: Arc<LoaderContext>,
}

impl PluginLoader {
    /// Create a loader over an in-memory environment.
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_environment(config, Environment::default())
    }

    /// Create a loader over the given environment.
    pub fn with_environment(config: LoaderConfig, env: Environment) -> Self {
        diag!(config.debug, ?config, "Plugin loader initialized");
        Self {
            ctx: Arc::new(LoaderContext {
                config,
                env,
                registry: RwLock::new(PluginRegistry::new()),
                state: Mutex::new(LoadState::default()),
            }),
        }
    }

    /// Loader configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.ctx.config
    }

    /// Collaborators this loader talks to.
    pub fn environment(&self) -> &Environment {
        &self.ctx.env
    }

    /// Register a plugin, replacing any previous definition under `name`.
    pub fn register(&self, name: &str, definition: PluginDefinition) -> Result<&Self> {
        self.ctx
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(name, definition)?;
        diag!(self.ctx.config.debug, plugin = %name, "Plugin registered");
        Ok(self)
    }

    /// Registered names, in registration order.
    pub fn list(&self) -> Vec<String> {
        self.ctx.registry().list()
    }

    /// Status of one plugin.
    pub fn status(&self, name: &str) -> Option<PluginStatus> {
        let state = self.ctx.state();
        let registry = self.ctx.registry();
        let plugin = registry.get(name)?;
        let loaded = state.loaded.get(name);

        Some(PluginStatus {
            loaded: loaded.is_some(),
            loading: state.loading.contains_key(name),
            has_detector: plugin.has_detector(),
            version: plugin.version.clone(),
            loaded_at: loaded.map(|l| l.loaded_at),
        })
    }

    /// Status of every plugin, in registration order.
    pub fn status_all(&self) -> Vec<(String, PluginStatus)> {
        self.list()
            .into_iter()
            .filter_map(|name| self.status(&name).map(|status| (name, status)))
            .collect()
    }

    /// Check if a plugin's export is cached.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.ctx.state().loaded.contains_key(name)
    }

    /// Check if a load is in flight.
    pub fn is_loading(&self, name: &str) -> bool {
        self.ctx.state().loading.contains_key(name)
    }

    /// Load a plugin.
    ///
    /// A cached plugin resolves immediately; a plugin already loading is
    /// joined; otherwise a new load starts. Unknown names and dependency
    /// cycles fail without starting anything.
    ///
    /// Starting a load requires a Tokio runtime: the load is spawned on the
    /// current one and runs to completion even if the returned future is
    /// dropped. Without a runtime it fails with [`Error::Runtime`].
    pub fn load(&self, name: &str) -> LoadFuture {
        let mut state = self.ctx.state();

        if let Some(loaded) = state.loaded.get(name) {
            let registry = self.ctx.registry();
            let global = registry.get(name).and_then(|p| p.global.as_deref());
            let export = self.ctx.published_or(global, loaded.export.clone());
            return future::ready(Ok(export)).boxed();
        }

        if let Some(in_flight) = state.loading.get(name) {
            diag!(self.ctx.config.debug, plugin = %name, "Joining in-flight load");
            return in_flight.task.clone().boxed();
        }

        let plugin = {
            let registry = self.ctx.registry();
            let Some(plugin) = registry.get(name) else {
                return future::ready(Err(Error::PluginNotFound(name.to_string()))).boxed();
            };
            // Cached plugins resolve at once and running loads wait only on
            // the dependencies they started with.
            let cycle = find_cycle(name, |dep| {
                if state.loaded.contains_key(dep) {
                    Some(&[] as &[String])
                } else if let Some(in_flight) = state.loading.get(dep) {
                    Some(in_flight.dependencies.as_slice())
                } else {
                    registry.dependencies(dep)
                }
            });
            if let Some(cycle) = cycle {
                return future::ready(Err(Error::CyclicDependency(cycle))).boxed();
            }
            plugin.clone()
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!(plugin = %name, error = %err, "Cannot start load outside a Tokio runtime");
                return future::ready(Err(Error::Runtime(err.to_string()))).boxed();
            }
        };

        diag!(self.ctx.config.debug, plugin = %name, "Loading plugin");

        let id = state.next_id;
        state.next_id += 1;
        let dependencies = plugin.dependencies.clone();
        let task = self.clone().run(plugin, id).boxed().shared();
        state.loading.insert(
            name.to_string(),
            InFlight {
                id,
                dependencies,
                task: task.clone(),
            },
        );
        drop(state);

        runtime.spawn(task.clone());
        task.boxed()
    }

    /// Load several plugins independently.
    ///
    /// One failure never blocks or cancels the others.
    pub async fn load_multiple<I, S>(&self, names: I) -> LoadReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        let outcomes = join_all(names.iter().map(|name| self.load(name))).await;

        let mut report = LoadReport::default();
        for (name, outcome) in names.into_iter().zip(outcomes) {
            match &outcome {
                Ok(_) => report.successful.push(name.clone()),
                Err(error) => report.failed.push(FailedLoad {
                    name: name.clone(),
                    error: error.clone(),
                }),
            }
            report.results.push((name, outcome));
        }
        report
    }

    /// Drop a loaded plugin's cached export and published global.
    ///
    /// Returns whether anything was unloaded. In-flight loads are untouched.
    pub fn unload(&self, name: &str) -> bool {
        let removed = self.ctx.state().loaded.remove(name).is_some();
        if !removed {
            return false;
        }

        let global = self
            .ctx
            .registry()
            .get(name)
            .and_then(|p| p.global.clone());
        if let Some(global) = global {
            self.ctx.env.globals.remove(&global);
        }

        diag!(self.ctx.config.debug, plugin = %name, "Plugin unloaded");
        true
    }

    /// Unload everything and forget in-flight loads. Registrations survive.
    pub fn reset(&self) {
        let loaded: Vec<String> = self.ctx.state().loaded.keys().cloned().collect();
        for name in &loaded {
            self.unload(name);
        }

        {
            let mut state = self.ctx.state();
            state.loaded.clear();
            state.loading.clear();
        }
        diag!(self.ctx.config.debug, "Loader reset");
    }

    pub(crate) fn detectors(&self) -> Vec<(String, Detector)> {
        self.ctx.registry().detectors()
    }

    async fn run(self, plugin: Plugin, id: u64) -> Result<PluginExport> {
        if let Err(error) = self.load_dependencies(&plugin).await {
            warn!(plugin = %plugin.name, error = %error, "Dependency failed to load");
            self.ctx.state().finish(&plugin.name, id);
            return Err(error);
        }

        let policy = RetryPolicy::new(self.ctx.config.retry_attempts, self.ctx.config.retry_delay());
        let outcome = policy
            .run(
                || plugin.run_loader(),
                |attempt, error: &BoxError| {
                    warn!(plugin = %plugin.name, attempt, error = %error, "Load attempt failed");
                },
            )
            .await;

        match outcome {
            RetryOutcome::Succeeded { value, attempts } => {
                Ok(self.publish(&plugin, id, value.into_export(), attempts))
            }
            RetryOutcome::Exhausted { error, attempts } => {
                let error = Error::LoadFailed {
                    name: plugin.name.clone(),
                    attempts,
                    source: error.into(),
                };
                warn!(plugin = %plugin.name, attempts, "Giving up on plugin");
                self.ctx.state().finish(&plugin.name, id);
                plugin.notify_error(&error);
                Err(error)
            }
        }
    }

    /// Load every dependency concurrently; the first failure in declaration
    /// order wins once all have settled.
    async fn load_dependencies(&self, plugin: &Plugin) -> Result<()> {
        if plugin.dependencies.is_empty() {
            return Ok(());
        }
        diag!(
            self.ctx.config.debug,
            plugin = %plugin.name,
            dependencies = ?plugin.dependencies,
            "Resolving dependencies"
        );

        let results = join_all(plugin.dependencies.iter().map(|dep| self.load(dep))).await;
        match results.into_iter().find_map(|r| r.err()) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn publish(&self, plugin: &Plugin, id: u64, export: PluginExport, attempts: u32) -> PluginExport {
        let globals = &self.ctx.env.globals;
        if let Some(global) = &plugin.global {
            globals.publish(global, export.clone());
        }

        if let Err(err) = plugin.notify_loaded(&export) {
            let error = Error::CallbackFailed {
                name: plugin.name.clone(),
                message: err.to_string(),
            };
            warn!(plugin = %plugin.name, error = %error, "onLoad callback failed");
            plugin.notify_error(&error);
        }

        let loaded_at = now();
        {
            let mut state = self.ctx.state();
            state.finish(&plugin.name, id);
            state.loaded.insert(
                plugin.name.clone(),
                Loaded {
                    export: export.clone(),
                    loaded_at,
                },
            );
        }
        diag!(self.ctx.config.debug, plugin = %plugin.name, attempts, "Plugin loaded");

        self.ctx.env.events.publish(PluginLoadedEvent {
            name: plugin.name.clone(),
            export: export.clone(),
            loaded_at,
        });

        self.ctx.published_or(plugin.global.as_deref(), export)
    }
}

impl Default for PluginLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}
