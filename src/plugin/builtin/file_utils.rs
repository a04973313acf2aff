//! JSON file helpers exposed as a plugin
//!
//! The workhorse of the data-processing scripts: single-file load/save
//! plus folder-wide loading that concatenates every JSON array in a
//! directory. Relative paths resolve against the directory containing
//! the plugin's manifest.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::Value;

use super::{required, required_str};
use crate::plugin::manifest::PluginManifest;
use crate::plugin::method::Plugin;
use crate::plugin::registry::MethodRegistry;

pub const NAME: &str = "file_utils";

pub fn register(registry: &MethodRegistry) {
    registry.register(NAME, "load_single_json");
    registry.register(NAME, "save_single_json");
    registry.register(NAME, "load_json_files_from_folder");
}

pub fn build(_manifest: &PluginManifest, path: &Path) -> Result<Plugin> {
    let base = path.parent().unwrap_or(Path::new(".")).to_path_buf();

    let load_base = base.clone();
    let save_base = base.clone();
    let folder_base = base;

    Ok(Plugin::new(NAME)
        .with_method("load_single_json", move |params| {
            let path = resolve(&load_base, required_str(&params, "path")?);
            load_single_json(&path)
        })
        .with_method("save_single_json", move |params| {
            let path = resolve(&save_base, required_str(&params, "path")?);
            let data = required(&params, "data")?;
            save_single_json(&path, data)?;
            Ok(Value::Null)
        })
        .with_method("load_json_files_from_folder", move |params| {
            let folder = resolve(&folder_base, required_str(&params, "path")?);
            load_json_files_from_folder(&folder)
        })
        .with_initialize(|| {
            tracing::info!("file_utils plugin initialized");
            Ok(())
        }))
}

fn resolve(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_single_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file: {}", path.display()))
}

fn save_single_json(path: &Path, data: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output folder: {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(data).context("Failed to serialize JSON data")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))?;

    tracing::info!(path = %path.display(), "JSON data saved");
    Ok(())
}

/// Concatenates every `*.json` array in a folder, in file-name order.
///
/// Unreadable or non-array files are logged and skipped; a missing
/// folder is an error.
fn load_json_files_from_folder(folder: &Path) -> Result<Value> {
    if !folder.is_dir() {
        bail!("Folder not found: {}", folder.display());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(folder)
        .with_context(|| format!("Failed to read folder: {}", folder.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    if files.is_empty() {
        tracing::warn!(folder = %folder.display(), "no JSON files in folder");
    }

    let mut all_data = Vec::new();
    for file in files {
        match load_single_json(&file) {
            Ok(Value::Array(items)) => all_data.extend(items),
            Ok(_) => {
                tracing::warn!(file = %file.display(), "JSON file is not an array, skipping");
            }
            Err(e) => {
                tracing::error!(
                    file = %file.display(),
                    error = %format!("{e:#}"),
                    "failed to load JSON file"
                );
            }
        }
    }

    Ok(Value::Array(all_data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn plugin_in(dir: &Path) -> Plugin {
        let manifest: PluginManifest = toml::from_str(r#"name = "file_utils""#).unwrap();
        build(&manifest, &dir.join("file_utils.toml")).unwrap()
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = TempDir::new().unwrap();
        let plugin = plugin_in(dir.path());

        let save = plugin.method("save_single_json").unwrap();
        save(json!({"path": "out/data.json", "data": {"score": 10}})).unwrap();

        let load = plugin.method("load_single_json").unwrap();
        let loaded = load(json!({"path": "out/data.json"})).unwrap();

        assert_eq!(loaded, json!({"score": 10}));
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let plugin = plugin_in(dir.path());

        let load = plugin.method("load_single_json").unwrap();
        assert!(load(json!({"path": "absent.json"})).is_err());
    }

    #[test]
    fn folder_load_concatenates_arrays_in_name_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.json"), r#"[{"id": 2}]"#).unwrap();
        fs::write(dir.path().join("a.json"), r#"[{"id": 1}]"#).unwrap();

        let plugin = plugin_in(dir.path());
        let load = plugin.method("load_json_files_from_folder").unwrap();
        let data = load(json!({"path": dir.path().display().to_string()})).unwrap();

        assert_eq!(data, json!([{"id": 1}, {"id": 2}]));
    }

    #[test]
    fn folder_load_skips_broken_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.json"), r#"[{"id": 1}]"#).unwrap();
        fs::write(dir.path().join("bad.json"), "not json").unwrap();
        fs::write(dir.path().join("object.json"), r#"{"id": 9}"#).unwrap();

        let plugin = plugin_in(dir.path());
        let load = plugin.method("load_json_files_from_folder").unwrap();
        let data = load(json!({"path": dir.path().display().to_string()})).unwrap();

        assert_eq!(data, json!([{"id": 1}]));
    }

    #[test]
    fn folder_load_requires_the_folder() {
        let dir = TempDir::new().unwrap();
        let plugin = plugin_in(dir.path());

        let load = plugin.method("load_json_files_from_folder").unwrap();
        assert!(load(json!({"path": "missing_folder"})).is_err());
    }
}
