//! Builtin plugin modules
//!
//! The helpers behind the community workflow, compiled into the binary.
//! Each module contributes its name, a registration function declaring
//! its methods, and a factory building the plugin value from a manifest.
//! A module only becomes active when a matching manifest file exists in
//! the plugins directory.

mod demo;
mod file_utils;
mod members_utils;
mod rank_utils;

use std::path::Path;

use anyhow::{anyhow, Result};
use serde_json::Value;

use super::manifest::PluginManifest;
use super::method::Plugin;
use super::registry::MethodRegistry;

/// A compiled-in plugin module
#[derive(Debug, Clone, Copy)]
pub struct PluginModule {
    /// Plugin name; the manifest is discovered as `<name>.toml`
    pub name: &'static str,

    /// Declares the plugin's methods in the registry
    pub register: fn(&MethodRegistry),

    /// Builds the plugin value from its manifest
    pub build: fn(&PluginManifest, &Path) -> Result<Plugin>,
}

const BUILTINS: &[PluginModule] = &[
    PluginModule {
        name: demo::NAME,
        register: demo::register,
        build: demo::build,
    },
    PluginModule {
        name: file_utils::NAME,
        register: file_utils::register,
        build: file_utils::build,
    },
    PluginModule {
        name: members_utils::NAME,
        register: members_utils::register,
        build: members_utils::build,
    },
    PluginModule {
        name: rank_utils::NAME,
        register: rank_utils::register,
        build: rank_utils::build,
    },
];

/// The catalog of plugin modules shipped with guildtrack
pub fn builtins() -> &'static [PluginModule] {
    BUILTINS
}

/// Fetches a required parameter from a params object
fn required<'a>(params: &'a Value, key: &str) -> Result<&'a Value> {
    params
        .get(key)
        .ok_or_else(|| anyhow!("missing parameter '{key}'"))
}

fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str> {
    required(params, key)?
        .as_str()
        .ok_or_else(|| anyhow!("parameter '{key}' must be a string"))
}

fn required_u64(params: &Value, key: &str) -> Result<u64> {
    required(params, key)?
        .as_u64()
        .ok_or_else(|| anyhow!("parameter '{key}' must be a non-negative integer"))
}
