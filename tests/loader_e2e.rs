//! End-to-end tests for the plugin loader
//!
//! These drive the real builtin catalog against temporary plugin
//! directories. Every test uses its own registry so they stay isolated
//! from each other and from the process-wide instance.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;

use guildtrack::plugin::{
    LoadOutcome, MethodRegistry, Plugin, PluginError, PluginLoader, PluginManager, PluginManifest,
    PluginModule,
};

fn write_manifest(dir: &Path, name: &str) {
    fs::write(
        dir.join(format!("{name}.toml")),
        format!("name = \"{name}\"\n"),
    )
    .unwrap();
}

#[test]
fn demo_plugin_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), "demo");

    let registry = MethodRegistry::new();
    let loader = PluginLoader::with_registry(&registry, dir.path()).unwrap();

    let demo = loader.plugin("demo").unwrap();
    assert_eq!(
        demo.call("greet", json!({"name": "Alice"})).unwrap(),
        json!("Hello, Alice! This is the demo plugin.")
    );
    assert_eq!(demo.call("add", json!({"a": 2, "b": 3})).unwrap(), json!(5));
}

#[test]
fn registered_methods_survive_a_second_loader() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), "demo");

    let registry = MethodRegistry::new();
    let _first = PluginLoader::with_registry(&registry, dir.path()).unwrap();
    let second = PluginLoader::with_registry(&registry, dir.path()).unwrap();

    assert_eq!(
        registry.methods("demo"),
        Some(vec!["greet".to_string(), "add".to_string()])
    );
    assert_eq!(
        second.plugin("demo").unwrap().call("add", json!({"a": 1, "b": 1})).unwrap(),
        json!(2)
    );
}

#[test]
fn loader_resolves_methods_through_the_manager() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), "demo");

    let registry = MethodRegistry::new();
    let loader = PluginLoader::with_registry(&registry, dir.path()).unwrap();

    let greet = loader.get_plugin_method("demo", "greet").unwrap();
    assert_eq!(
        greet(json!({"name": "Bob"})).unwrap(),
        json!("Hello, Bob! This is the demo plugin.")
    );

    assert_eq!(
        loader.get_plugin_method("demo", "nope").err(),
        Some(PluginError::NotRegistered {
            plugin: "demo".to_string(),
            method: "nope".to_string(),
        })
    );
    assert_eq!(
        loader.get_plugin_method("stranger", "greet").err(),
        Some(PluginError::NotLoaded("stranger".to_string()))
    );
}

#[test]
fn several_builtin_plugins_load_side_by_side() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), "demo");
    write_manifest(dir.path(), "file_utils");
    write_manifest(dir.path(), "rank_utils");

    let registry = MethodRegistry::new();
    let loader = PluginLoader::with_registry(&registry, dir.path()).unwrap();

    let mut loaded = loader.manager().list_plugins();
    loaded.sort_unstable();
    assert_eq!(loaded, vec!["demo", "file_utils", "rank_utils"]);
    assert_eq!(loader.report().loaded_count(), 3);
}

fn register_grumpy(registry: &MethodRegistry) {
    registry.register("grumpy", "noop");
}

fn build_grumpy(_manifest: &PluginManifest, _path: &Path) -> anyhow::Result<Plugin> {
    Ok(Plugin::new("grumpy")
        .with_method("noop", |_| Ok(Value::Null))
        .with_initialize(|| anyhow::bail!("refusing to initialize")))
}

#[test]
fn failing_initialize_still_exposes_the_plugin() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), "grumpy");

    let registry = MethodRegistry::new();
    let catalog = vec![PluginModule {
        name: "grumpy",
        register: register_grumpy,
        build: build_grumpy,
    }];
    let loader = PluginLoader::with_manager(
        &registry,
        dir.path(),
        PluginManager::with_catalog(catalog),
    )
    .unwrap();

    assert_eq!(loader.manager().list_plugins(), vec!["grumpy"]);
    assert!(loader
        .report()
        .outcomes
        .iter()
        .any(|o| matches!(o, LoadOutcome::InitFailed { plugin, .. } if plugin == "grumpy")));
    assert_eq!(
        loader.plugin("grumpy").unwrap().call("noop", json!({})).unwrap(),
        Value::Null
    );
}

#[test]
fn missing_manifest_reduces_the_surface_without_crashing() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), "demo");

    let registry = MethodRegistry::new();
    // Declared, but no matching manifest file in this directory.
    registry.register("phantom", "walk");

    let loader = PluginLoader::with_registry(&registry, dir.path()).unwrap();

    assert_eq!(loader.manager().list_plugins(), vec!["demo"]);
    let phantom = loader.plugin("phantom").unwrap();
    assert!(phantom.is_empty());
    assert!(phantom.call("walk", json!({})).is_err());
}

#[test]
fn pipeline_flows_between_plugins() {
    // file_utils output feeds rank_utils, the same shape the rank
    // command wires up.
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), "file_utils");
    write_manifest(dir.path(), "rank_utils");

    let battles = dir.path().join("battles");
    fs::create_dir(&battles).unwrap();
    fs::write(
        battles.join("week1.json"),
        r#"[{"member_id": 1, "rank": 2}, {"member_id": 3, "rank": 1}]"#,
    )
    .unwrap();

    let registry = MethodRegistry::new();
    let loader = PluginLoader::with_registry(&registry, dir.path()).unwrap();

    let records = loader
        .plugin("file_utils")
        .unwrap()
        .call("load_json_files_from_folder", json!({"path": "battles"}))
        .unwrap();

    let rankings = loader
        .plugin("rank_utils")
        .unwrap()
        .call(
            "calculate_rankings",
            json!({
                "records": records,
                "members": {
                    "1": {"name": "Alice", "status": 1},
                    "3": {"name": "Charlie", "status": 1}
                }
            }),
        )
        .unwrap();

    assert_eq!(rankings[0]["member_id"], json!(3));
    assert_eq!(rankings[0]["rank_score"], json!(50));
    assert_eq!(rankings[1]["member_id"], json!(1));
    assert_eq!(rankings[1]["rank_score"], json!(49));
}
