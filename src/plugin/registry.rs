//! Plugin registry.
//!
//! Pure data holder: definitions by name in registration order, plus the
//! detector index consulted by the auto-detect pass.

use crate::core::Result;
use crate::detect::Detector;
use crate::plugin::definition::{Plugin, PluginDefinition};
use std::collections::{HashMap, HashSet};

/// Plugin registry.
#[derive(Default)]
pub struct PluginRegistry {
    /// Registered plugins
    plugins: HashMap<String, Plugin>,
    /// Names in registration order
    order: Vec<String>,
    /// Names with a detector, in registration order
    detectors: Vec<String>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin, replacing any previous definition under `name`.
    ///
    /// A replaced plugin keeps its position in the registration order.
    pub fn register(&mut self, name: &str, definition: PluginDefinition) -> Result<&Plugin> {
        let plugin = Plugin::from_definition(name, definition)?;

        if !self.plugins.contains_key(name) {
            self.order.push(name.to_string());
        }

        let indexed = self.detectors.iter().any(|n| n == name);
        match (plugin.has_detector(), indexed) {
            (true, false) => self.detectors.push(name.to_string()),
            (false, true) => self.detectors.retain(|n| n != name),
            _ => {}
        }

        self.plugins.insert(name.to_string(), plugin);
        Ok(&self.plugins[name])
    }

    /// Get plugin by name.
    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.get(name)
    }

    /// Check if a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// All names, in registration order.
    pub fn list(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Registered detectors, in registration order.
    pub fn detectors(&self) -> Vec<(String, Detector)> {
        self.detectors
            .iter()
            .filter_map(|name| {
                let detector = self.plugins.get(name)?.detector.clone()?;
                Some((name.clone(), detector))
            })
            .collect()
    }

    /// Plugin count.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Declared dependencies of a registered plugin.
    pub fn dependencies(&self, name: &str) -> Option<&[String]> {
        self.plugins.get(name).map(|p| p.dependencies.as_slice())
    }

    /// Find a cycle in the registered dependency graph reachable from `root`.
    pub fn find_cycle(&self, root: &str) -> Option<Vec<String>> {
        find_cycle(root, |name| self.dependencies(name))
    }
}

/// Find a dependency cycle reachable from `root`.
///
/// `edges` yields the names a node waits on; `None` marks a node that is
/// not part of the graph (it fails later as not found). Returns the cycle
/// path with the repeated name at both ends.
pub fn find_cycle<'a, F>(root: &'a str, edges: F) -> Option<Vec<String>>
where
    F: Fn(&str) -> Option<&'a [String]>,
{
    let mut path = Vec::new();
    let mut done = HashSet::new();
    visit(root, &edges, &mut path, &mut done)
}

fn visit<'a, F>(
    name: &'a str,
    edges: &F,
    path: &mut Vec<&'a str>,
    done: &mut HashSet<&'a str>,
) -> Option<Vec<String>>
where
    F: Fn(&str) -> Option<&'a [String]>,
{
    if let Some(start) = path.iter().position(|n| *n == name) {
        let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
        cycle.push(name.to_string());
        return Some(cycle);
    }
    if done.contains(name) {
        return None;
    }
    let dependencies = edges(name)?;

    path.push(name);
    for dep in dependencies {
        if let Some(cycle) = visit(dep, edges, path, done) {
            return Some(cycle);
        }
    }
    path.pop();
    done.insert(name);
    None
}
