//! Plugin capability values
//!
//! A loaded plugin is a plain value: a mapping from method name to a
//! callable taking JSON params and returning a JSON result, plus an
//! optional initialization hook. Factories in the builtin catalog
//! construct these; the manager owns them after loading.

use std::fmt;
use std::rc::Rc;

use anyhow::Result;
use indexmap::IndexMap;
use serde_json::Value;

/// A bound plugin method: JSON params in, JSON result out.
///
/// Clones of the `Rc` are the "bound callable" handed out by the manager
/// and the per-plugin namespaces. Deliberately not `Send` - loading and
/// dispatch are single-threaded.
pub type MethodFn = Rc<dyn Fn(Value) -> Result<Value>>;

type InitFn = Box<dyn Fn() -> Result<()>>;

/// A loaded plugin: named callables plus an optional init hook
pub struct Plugin {
    name: String,
    methods: IndexMap<String, MethodFn>,
    initialize: Option<InitFn>,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: IndexMap::new(),
            initialize: None,
        }
    }

    /// Adds a callable under `name`
    pub fn with_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + 'static,
    {
        self.methods.insert(name.into(), Rc::new(f));
        self
    }

    /// Sets the hook run once right after the plugin is stored
    pub fn with_initialize<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<()> + 'static,
    {
        self.initialize = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a bound handle to a provided method, if any
    pub fn method(&self, name: &str) -> Option<MethodFn> {
        self.methods.get(name).cloned()
    }

    /// Names of the methods this plugin actually provides
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn has_initialize(&self) -> bool {
        self.initialize.is_some()
    }

    /// Runs the init hook; a plugin without one initializes trivially
    pub(crate) fn run_initialize(&self) -> Result<()> {
        match &self.initialize {
            Some(init) => init(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("has_initialize", &self.initialize.is_some())
            .finish()
    }
}
