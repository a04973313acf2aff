//! Plugin method registry
//!
//! Plugins declare their public methods here before anything is loaded.
//! Each plugin module's `register` function appends method names under the
//! plugin's name; the manager later resolves the actual callables against
//! the loaded plugin value. Declaring and loading are deliberately
//! decoupled so the registry can be populated in one pass and consumed in
//! another.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock, PoisonError};

use indexmap::IndexMap;

#[derive(Default)]
struct RegistryState {
    /// plugin name -> method names, both in first-registration order
    methods: IndexMap<String, Vec<String>>,

    /// plugin modules whose registration function has already run
    registered_modules: HashSet<String>,
}

/// Ordered table of plugin name -> declared method names.
///
/// Production code shares the process-wide instance from [`global`];
/// tests construct their own instances for isolation.
///
/// [`global`]: MethodRegistry::global
pub struct MethodRegistry {
    state: Mutex<RegistryState>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Returns the process-wide registry shared by all production loaders
    pub fn global() -> &'static MethodRegistry {
        static GLOBAL: OnceLock<MethodRegistry> = OnceLock::new();
        GLOBAL.get_or_init(MethodRegistry::new)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Declares `method` as part of `plugin`'s public surface.
    ///
    /// The first registration wins the position; re-registering the same
    /// method name for the same plugin is a no-op. Returns whether a new
    /// entry was created. Registration cannot fail.
    pub fn register(&self, plugin: &str, method: &str) -> bool {
        let mut state = self.lock();
        let methods = state.methods.entry(plugin.to_string()).or_default();
        if methods.iter().any(|m| m == method) {
            return false;
        }
        methods.push(method.to_string());
        tracing::debug!(plugin, method, "plugin method registered");
        true
    }

    /// Plugin names in first-registration order
    pub fn plugins(&self) -> Vec<String> {
        self.lock().methods.keys().cloned().collect()
    }

    /// Declared method names for `plugin`, in registration order
    pub fn methods(&self, plugin: &str) -> Option<Vec<String>> {
        self.lock().methods.get(plugin).cloned()
    }

    /// Snapshot of the whole table, insertion-ordered
    pub fn entries(&self) -> Vec<(String, Vec<String>)> {
        self.lock()
            .methods
            .iter()
            .map(|(name, methods)| (name.clone(), methods.clone()))
            .collect()
    }

    /// Records that `module`'s registration function has run.
    ///
    /// Returns false if it was already recorded, so callers can make the
    /// registration pass idempotent across repeated loader constructions.
    pub fn mark_registered(&self, module: &str) -> bool {
        self.lock().registered_modules.insert(module.to_string())
    }

    /// Clears every entry. Intended for test isolation only.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.methods.clear();
        state.registered_modules.clear();
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn register_preserves_order() {
        let registry = MethodRegistry::new();
        registry.register("demo", "greet");
        registry.register("demo", "add");
        registry.register("other", "run");

        assert_eq!(
            registry.methods("demo"),
            Some(vec!["greet".to_string(), "add".to_string()])
        );
        assert_eq!(registry.plugins(), vec!["demo", "other"]);
    }

    #[test]
    fn duplicate_registration_is_a_noop() {
        let registry = MethodRegistry::new();
        assert!(registry.register("demo", "greet"));
        assert!(!registry.register("demo", "greet"));

        assert_eq!(registry.methods("demo"), Some(vec!["greet".to_string()]));
    }

    #[test]
    fn same_method_name_on_different_plugins() {
        let registry = MethodRegistry::new();
        assert!(registry.register("a", "run"));
        assert!(registry.register("b", "run"));

        assert_eq!(registry.methods("a"), Some(vec!["run".to_string()]));
        assert_eq!(registry.methods("b"), Some(vec!["run".to_string()]));
    }

    #[test]
    fn unknown_plugin_has_no_methods() {
        let registry = MethodRegistry::new();
        assert_eq!(registry.methods("missing"), None);
    }

    #[test]
    fn mark_registered_is_once_only() {
        let registry = MethodRegistry::new();
        assert!(registry.mark_registered("demo"));
        assert!(!registry.mark_registered("demo"));
    }

    #[test]
    fn reset_clears_everything() {
        let registry = MethodRegistry::new();
        registry.register("demo", "greet");
        registry.mark_registered("demo");

        registry.reset();

        assert!(registry.plugins().is_empty());
        assert!(registry.mark_registered("demo"));
    }

    #[test]
    fn global_registry_is_shared() {
        // Only this test touches the global instance; everything else uses
        // local registries so parallel tests stay isolated.
        let marker = "registry_global_test_plugin";
        MethodRegistry::global().register(marker, "ping");
        MethodRegistry::global().register(marker, "ping");

        assert_eq!(
            MethodRegistry::global().methods(marker),
            Some(vec!["ping".to_string()])
        );
    }

    proptest! {
        /// For any registration sequence, the stored list equals the input
        /// with duplicates dropped, keeping first occurrences in order.
        #[test]
        fn registration_dedupes_and_keeps_first_order(
            names in proptest::collection::vec("[a-d]", 0..24)
        ) {
            let registry = MethodRegistry::new();
            for name in &names {
                registry.register("p", name);
            }

            let mut expected: Vec<String> = Vec::new();
            for name in &names {
                if !expected.contains(name) {
                    expected.push(name.clone());
                }
            }

            prop_assert_eq!(registry.methods("p").unwrap_or_default(), expected);
        }
    }
}
