//! Plugin manifest files
//!
//! Each plugin is declared by a `<plugins_dir>/<name>.toml` file. The
//! manifest is the unit of discovery: the loader scans for manifests, and
//! the manager reads one before handing it to the plugin's factory.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Manifest declaring a plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugin name (conventionally the manifest file stem)
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Free-form options passed to the plugin factory
    #[serde(default)]
    pub options: toml::Table,
}

impl PluginManifest {
    /// Reads and parses a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plugin manifest: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse plugin manifest: {}", path.display()))
    }

    /// Looks up a string option
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(toml::Value::as_str)
    }
}
