//! Plugin discovery and loading
//!
//! The loader is the composition root: it scans the plugins directory for
//! manifest files, runs each discovered module's registration function,
//! hands the resulting declarations to the manager, drives loading, and
//! binds every resolved method onto a per-plugin namespace.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde_json::Value;

use super::manager::{LoadReport, PluginError, PluginManager};
use super::method::MethodFn;
use super::registry::MethodRegistry;

/// A plugin's resolved call surface: method name -> bound callable.
///
/// Methods that failed to resolve are simply absent; calling one fails
/// with a lookup error instead of crashing the host.
pub struct PluginNamespace {
    plugin: String,
    methods: IndexMap<String, MethodFn>,
}

impl PluginNamespace {
    fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            methods: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.plugin
    }

    /// Returns the bound callable, if it was resolved
    pub fn get(&self, method: &str) -> Option<&MethodFn> {
        self.methods.get(method)
    }

    /// Names of the bound methods, in registration order
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Invokes a bound method with JSON params
    pub fn call(&self, method: &str, params: Value) -> Result<Value> {
        let bound = self.methods.get(method).ok_or_else(|| PluginError::NotBound {
            plugin: self.plugin.clone(),
            method: method.to_string(),
        })?;
        bound(params)
    }
}

/// Discovers, registers, and loads plugins from a directory
pub struct PluginLoader {
    plugins_dir: PathBuf,
    manager: PluginManager,
    namespaces: IndexMap<String, PluginNamespace>,
    report: LoadReport,
}

impl PluginLoader {
    /// Discovers and loads plugins from `plugins_dir` using the shared
    /// process-wide registry.
    pub fn new(plugins_dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_registry(MethodRegistry::global(), plugins_dir)
    }

    /// Same, against an explicit registry (test isolation)
    pub fn with_registry(registry: &MethodRegistry, plugins_dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_manager(registry, plugins_dir, PluginManager::new())
    }

    /// Same, with a caller-supplied manager (custom catalogs)
    pub fn with_manager(
        registry: &MethodRegistry,
        plugins_dir: impl AsRef<Path>,
        mut manager: PluginManager,
    ) -> Result<Self> {
        let plugins_dir = plugins_dir.as_ref();
        let plugins_dir = plugins_dir.canonicalize().with_context(|| {
            format!("Plugins directory not found: {}", plugins_dir.display())
        })?;
        tracing::info!(dir = %plugins_dir.display(), "scanning plugins directory");

        // Discovery pass: run registration for every manifest with a
        // known module, once per process.
        for stem in Self::manifest_stems(&plugins_dir)? {
            match manager.module(&stem) {
                Some(module) => {
                    if registry.mark_registered(&stem) {
                        (module.register)(registry);
                        tracing::info!(plugin = %stem, "plugin module registered");
                    } else {
                        tracing::debug!(plugin = %stem, "plugin module already registered");
                    }
                }
                None => {
                    tracing::debug!(file = %stem, "no plugin module for manifest, ignoring");
                }
            }
        }

        // Metadata pass: every declared plugin whose manifest exists in
        // this directory becomes loadable.
        for (plugin, methods) in registry.entries() {
            if methods.is_empty() {
                continue;
            }
            let expected = plugins_dir.join(format!("{plugin}.toml"));
            if expected.exists() {
                manager.add_plugin_info(&plugin, expected, methods);
            } else {
                tracing::error!(
                    plugin = %plugin,
                    path = %expected.display(),
                    "plugin manifest not found, skipping"
                );
            }
        }

        let report = manager.load_all_plugins();

        // Binding pass: resolve each declared method to a bound callable.
        // Resolution failures leave the method unbound instead of
        // propagating.
        let mut namespaces = IndexMap::new();
        for (plugin, methods) in registry.entries() {
            let mut namespace = PluginNamespace::new(&plugin);
            for method in &methods {
                match manager.get_plugin_method(&plugin, method) {
                    Ok(bound) => {
                        namespace.methods.insert(method.clone(), bound);
                        tracing::debug!(plugin = %plugin, method = %method, "plugin method bound");
                    }
                    Err(e) => {
                        tracing::error!(
                            plugin = %plugin,
                            method = %method,
                            error = %e,
                            "failed to bind plugin method"
                        );
                    }
                }
            }
            namespaces.insert(plugin, namespace);
        }

        Ok(Self { plugins_dir, manager, namespaces, report })
    }

    /// Candidate plugin names: `<stem>.toml` files directly inside the
    /// plugins directory, skipping `_`-prefixed names, sorted for
    /// deterministic load order.
    fn manifest_stems(plugins_dir: &Path) -> Result<Vec<String>> {
        let entries = fs::read_dir(plugins_dir).with_context(|| {
            format!("Failed to read plugins directory: {}", plugins_dir.display())
        })?;

        let mut stems = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| {
                format!("Failed to read plugins directory: {}", plugins_dir.display())
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.starts_with('_') {
                continue;
            }
            if path.extension().is_some_and(|ext| ext == "toml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    stems.push(stem.to_string());
                }
            }
        }
        stems.sort();
        Ok(stems)
    }

    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    /// The namespace for a declared plugin, if any.
    ///
    /// Plugins that failed to load keep an empty namespace; plugins never
    /// declared are absent.
    pub fn plugin(&self, name: &str) -> Option<&PluginNamespace> {
        self.namespaces.get(name)
    }

    /// All namespaces, in registration order
    pub fn plugins(&self) -> impl Iterator<Item = &PluginNamespace> {
        self.namespaces.values()
    }

    /// Resolves a bound method straight from the manager
    pub fn get_plugin_method(&self, plugin: &str, method: &str) -> Result<MethodFn, PluginError> {
        self.manager.get_plugin_method(plugin, method)
    }

    pub fn manager(&self) -> &PluginManager {
        &self.manager
    }

    /// Outcomes of the load pass this loader ran
    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::builtin::PluginModule;
    use crate::plugin::manifest::PluginManifest;
    use crate::plugin::method::Plugin;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn register_echo(registry: &MethodRegistry) {
        registry.register("echo", "echo");
    }

    fn build_echo(_manifest: &PluginManifest, _path: &Path) -> Result<Plugin> {
        Ok(Plugin::new("echo").with_method("echo", |params| Ok(params)))
    }

    fn echo_catalog() -> Vec<PluginModule> {
        vec![PluginModule { name: "echo", register: register_echo, build: build_echo }]
    }

    fn write_manifest(dir: &Path, name: &str) {
        fs::write(dir.join(format!("{name}.toml")), format!("name = \"{name}\"\n")).unwrap();
    }

    #[test]
    fn missing_plugins_directory_is_fatal() {
        let registry = MethodRegistry::new();
        let result = PluginLoader::with_registry(&registry, "/definitely/not/here");

        assert!(result.is_err());
    }

    #[test]
    fn empty_directory_loads_nothing() {
        let dir = TempDir::new().unwrap();
        let registry = MethodRegistry::new();

        let loader = PluginLoader::with_registry(&registry, dir.path()).unwrap();

        assert!(loader.manager().list_plugins().is_empty());
        assert_eq!(loader.plugins().count(), 0);
    }

    #[test]
    fn discovers_and_binds_a_plugin() {
        let dir = TempDir::new().unwrap();
        write_manifest(dir.path(), "echo");

        let registry = MethodRegistry::new();
        let loader = PluginLoader::with_manager(
            &registry,
            dir.path(),
            PluginManager::with_catalog(echo_catalog()),
        )
        .unwrap();

        let ns = loader.plugin("echo").unwrap();
        assert_eq!(ns.call("echo", json!({"x": 1})).unwrap(), json!({"x": 1}));
    }

    #[test]
    fn ignores_private_and_foreign_files() {
        let dir = TempDir::new().unwrap();
        write_manifest(dir.path(), "_echo");
        fs::write(dir.path().join("echo.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let registry = MethodRegistry::new();
        let loader = PluginLoader::with_manager(
            &registry,
            dir.path(),
            PluginManager::with_catalog(echo_catalog()),
        )
        .unwrap();

        assert!(registry.plugins().is_empty());
        assert!(loader.manager().list_plugins().is_empty());
    }

    #[test]
    fn declared_plugin_without_manifest_is_skipped() {
        let dir = TempDir::new().unwrap();
        write_manifest(dir.path(), "echo");

        let registry = MethodRegistry::new();
        // Declared out of band, but no ghost.toml exists in the directory.
        registry.register("ghost", "boo");

        let loader = PluginLoader::with_manager(
            &registry,
            dir.path(),
            PluginManager::with_catalog(echo_catalog()),
        )
        .unwrap();

        assert_eq!(loader.manager().list_plugins(), vec!["echo"]);
        let ghost = loader.plugin("ghost").unwrap();
        assert!(ghost.is_empty());
        assert!(matches!(
            ghost.call("boo", json!({})).unwrap_err().downcast_ref(),
            Some(PluginError::NotBound { .. })
        ));
    }

    #[test]
    fn repeated_construction_does_not_duplicate_registrations() {
        let dir = TempDir::new().unwrap();
        write_manifest(dir.path(), "echo");

        let registry = MethodRegistry::new();
        for _ in 0..2 {
            let loader = PluginLoader::with_manager(
                &registry,
                dir.path(),
                PluginManager::with_catalog(echo_catalog()),
            )
            .unwrap();
            assert_eq!(loader.manager().list_plugins(), vec!["echo"]);
        }

        assert_eq!(registry.methods("echo"), Some(vec!["echo".to_string()]));
    }

    #[test]
    fn namespace_lookup_for_unknown_plugin_is_none() {
        let dir = TempDir::new().unwrap();
        let registry = MethodRegistry::new();
        let loader = PluginLoader::with_registry(&registry, dir.path()).unwrap();

        assert!(loader.plugin("nope").is_none());
    }
}
