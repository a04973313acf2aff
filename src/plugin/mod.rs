//! # Plugin System
//!
//! Discovery, registration, and dispatch for guildtrack helper plugins.
//!
//! ## Overview
//!
//! Every plugin ships compiled into the binary as a module in the builtin
//! catalog; a manifest file in the plugins directory decides whether (and
//! with which options) it is active. Methods are declared up front in a
//! registry and resolved against the loaded plugin values afterwards.
//!
//! ## Lifecycle
//!
//! ```text
//! scan plugins dir          <name>.toml manifests, sorted
//!   -> register             each module declares its methods
//!   -> add_plugin_info      declared plugins with an existing manifest
//!   -> load_all_plugins     manifest -> factory -> initialize hook
//!   -> bind namespaces      method name -> bound callable, per plugin
//! ```
//!
//! A broken plugin never aborts the pass: load failures are logged,
//! collected into a [`LoadReport`], and the plugin's methods stay unbound.
//!
//! ## Calling a method
//!
//! ```no_run
//! # use guildtrack::plugin::PluginLoader;
//! # fn demo() -> anyhow::Result<()> {
//! let loader = PluginLoader::new(".guildtrack/plugins")?;
//! let greeting = loader
//!     .plugin("demo")
//!     .expect("demo plugin declared")
//!     .call("greet", serde_json::json!({"name": "Alice"}))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Types
//!
//! - [`MethodRegistry`] - declared plugin method table
//! - [`PluginManager`] - metadata, loaded plugins, method resolution
//! - [`PluginLoader`] - discovery and per-plugin namespaces
//! - [`Plugin`] - a loaded plugin's capability value
//! - [`LoadReport`] - per-plugin outcomes of a load pass

pub mod builtin;
mod loader;
mod manager;
mod manifest;
mod method;
mod registry;

pub use builtin::{builtins, PluginModule};
pub use loader::{PluginLoader, PluginNamespace};
pub use manager::{LoadOutcome, LoadReport, PluginError, PluginInfo, PluginManager};
pub use manifest::PluginManifest;
pub use method::{MethodFn, Plugin};
pub use registry::MethodRegistry;
