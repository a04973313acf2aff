//! Plugin manager
//!
//! Bridges declared plugin metadata and live plugin values, and resolves
//! method lookups against the loaded set. Loading tolerates per-plugin
//! failure: one broken plugin never prevents the rest from loading.

use std::path::{Path, PathBuf};

use anyhow::Result;
use indexmap::IndexMap;
use thiserror::Error;

use super::builtin::{self, PluginModule};
use super::manifest::PluginManifest;
use super::method::{MethodFn, Plugin};

/// Method resolution failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PluginError {
    #[error("plugin '{0}' is not loaded")]
    NotLoaded(String),

    #[error("method '{method}' is not registered for plugin '{plugin}'")]
    NotRegistered { plugin: String, method: String },

    #[error("method '{method}' of plugin '{plugin}' is not callable")]
    NotCallable { plugin: String, method: String },

    #[error("method '{method}' is not bound on plugin '{plugin}'")]
    NotBound { plugin: String, method: String },
}

/// Metadata for a declared plugin
#[derive(Debug, Clone)]
pub struct PluginInfo {
    /// Absolute path to the plugin's manifest file
    pub path: PathBuf,

    /// Registered method names, in declaration order
    pub methods: Vec<String>,
}

/// Outcome of one plugin load attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Loaded and initialized
    Loaded { plugin: String },

    /// Loaded, but the initialize hook failed; the plugin stays loaded
    InitFailed { plugin: String, error: String },

    /// Not loaded
    Failed { plugin: String, error: String },
}

impl LoadOutcome {
    pub fn plugin(&self) -> &str {
        match self {
            LoadOutcome::Loaded { plugin }
            | LoadOutcome::InitFailed { plugin, .. }
            | LoadOutcome::Failed { plugin, .. } => plugin,
        }
    }

    /// True when the plugin ended up in the loaded set
    pub fn is_loaded(&self) -> bool {
        !matches!(self, LoadOutcome::Failed { .. })
    }
}

/// Report collected from [`PluginManager::load_all_plugins`]
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub outcomes: Vec<LoadOutcome>,
}

impl LoadReport {
    pub fn loaded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_loaded()).count()
    }

    /// Outcomes that did not load cleanly (failures and failed inits)
    pub fn failures(&self) -> impl Iterator<Item = &LoadOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o, LoadOutcome::Loaded { .. }))
    }
}

/// Owns plugin metadata and loaded plugin values
pub struct PluginManager {
    catalog: Vec<PluginModule>,
    plugin_info: IndexMap<String, PluginInfo>,
    plugins: IndexMap<String, Plugin>,
}

impl PluginManager {
    /// Manager over the builtin plugin catalog
    pub fn new() -> Self {
        Self::with_catalog(builtin::builtins().to_vec())
    }

    /// Manager over an explicit catalog (used by tests)
    pub fn with_catalog(catalog: Vec<PluginModule>) -> Self {
        Self {
            catalog,
            plugin_info: IndexMap::new(),
            plugins: IndexMap::new(),
        }
    }

    pub(crate) fn module(&self, name: &str) -> Option<&PluginModule> {
        self.catalog.iter().find(|m| m.name == name)
    }

    /// Registers metadata for a plugin.
    ///
    /// The first registration wins: a duplicate name is logged and the
    /// prior entry kept.
    pub fn add_plugin_info(&mut self, name: &str, path: impl Into<PathBuf>, methods: Vec<String>) {
        if self.plugin_info.contains_key(name) {
            tracing::warn!(plugin = name, "plugin info already exists, keeping first entry");
            return;
        }
        self.plugin_info
            .insert(name.to_string(), PluginInfo { path: path.into(), methods });
        tracing::info!(plugin = name, "plugin info added");
    }

    pub fn plugin_info(&self, name: &str) -> Option<&PluginInfo> {
        self.plugin_info.get(name)
    }

    /// Loads every known plugin, in registration order.
    ///
    /// Each attempt is isolated: a missing manifest, a parse error, an
    /// unknown module, or a failing factory is logged, recorded in the
    /// report, and skipped. A failing initialize hook leaves the plugin
    /// loaded.
    pub fn load_all_plugins(&mut self) -> LoadReport {
        let mut report = LoadReport::default();
        let names: Vec<String> = self.plugin_info.keys().cloned().collect();

        for name in names {
            let path = self.plugin_info[&name].path.clone();
            if !path.exists() {
                tracing::error!(
                    plugin = %name,
                    path = %path.display(),
                    "plugin manifest does not exist"
                );
                report.outcomes.push(LoadOutcome::Failed {
                    plugin: name,
                    error: format!("manifest does not exist: {}", path.display()),
                });
                continue;
            }

            match self.load_plugin(&name, &path) {
                Ok(plugin) => {
                    self.plugins.insert(name.clone(), plugin);
                    tracing::info!(plugin = %name, "plugin loaded");
                    report.outcomes.push(self.initialize_plugin(&name));
                }
                Err(e) => {
                    tracing::error!(plugin = %name, error = %format!("{e:#}"), "failed to load plugin");
                    report.outcomes.push(LoadOutcome::Failed {
                        plugin: name,
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        report
    }

    /// Loads one plugin: manifest, catalog lookup, factory
    fn load_plugin(&self, name: &str, path: &Path) -> Result<Plugin> {
        let manifest = PluginManifest::load(path)?;
        if manifest.name != name {
            tracing::warn!(
                plugin = name,
                manifest = %manifest.name,
                "manifest name does not match plugin name"
            );
        }

        let module = self
            .module(name)
            .ok_or_else(|| anyhow::anyhow!("no plugin module named '{name}' in the catalog"))?;

        (module.build)(&manifest, path)
    }

    /// Runs the optional init hook exactly once, right after loading.
    ///
    /// A hook failure degrades the plugin (it stays loaded without its
    /// setup side effects) instead of removing it.
    fn initialize_plugin(&self, name: &str) -> LoadOutcome {
        let Some(plugin) = self.plugins.get(name) else {
            return LoadOutcome::Failed {
                plugin: name.to_string(),
                error: "plugin disappeared before initialization".to_string(),
            };
        };

        if !plugin.has_initialize() {
            tracing::debug!(plugin = name, "no initialize hook");
            return LoadOutcome::Loaded { plugin: name.to_string() };
        }

        match plugin.run_initialize() {
            Ok(()) => {
                tracing::info!(plugin = name, "plugin initialized");
                LoadOutcome::Loaded { plugin: name.to_string() }
            }
            Err(e) => {
                tracing::error!(plugin = name, error = %format!("{e:#}"), "plugin initialization failed");
                LoadOutcome::InitFailed {
                    plugin: name.to_string(),
                    error: format!("{e:#}"),
                }
            }
        }
    }

    /// Resolves a bound method from a loaded plugin.
    ///
    /// The declared method list is the authoritative surface: a callable
    /// the plugin provides but never registered resolves to
    /// [`PluginError::NotRegistered`]; a registered name the plugin does
    /// not provide resolves to [`PluginError::NotCallable`].
    pub fn get_plugin_method(&self, plugin: &str, method: &str) -> Result<MethodFn, PluginError> {
        let loaded = self
            .plugins
            .get(plugin)
            .ok_or_else(|| PluginError::NotLoaded(plugin.to_string()))?;

        let registered = self
            .plugin_info
            .get(plugin)
            .is_some_and(|info| info.methods.iter().any(|m| m == method));
        if !registered {
            return Err(PluginError::NotRegistered {
                plugin: plugin.to_string(),
                method: method.to_string(),
            });
        }

        loaded.method(method).ok_or_else(|| PluginError::NotCallable {
            plugin: plugin.to_string(),
            method: method.to_string(),
        })
    }

    /// Names of successfully loaded plugins, in load order
    pub fn list_plugins(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    /// Declared methods of a loaded plugin
    pub fn list_plugin_methods(&self, plugin: &str) -> Result<Vec<String>, PluginError> {
        if !self.plugins.contains_key(plugin) {
            return Err(PluginError::NotLoaded(plugin.to_string()));
        }
        Ok(self
            .plugin_info
            .get(plugin)
            .map(|info| info.methods.clone())
            .unwrap_or_default())
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}
