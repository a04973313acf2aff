//! Plugin management commands

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;

use super::output::Output;
use crate::config::Config;
use crate::plugin::{LoadOutcome, PluginLoader};

#[derive(Subcommand)]
pub enum PluginCommands {
    /// List loaded plugins and their methods
    List,

    /// Show the registered methods of a plugin
    Methods {
        /// Plugin name
        name: String,
    },

    /// Call a plugin method with JSON params
    Call {
        /// Plugin name
        plugin: String,

        /// Method name
        method: String,

        /// JSON object with method parameters
        #[arg(long, default_value = "{}")]
        params: String,
    },
}

pub fn run(cmd: PluginCommands, config: &Config, output: &Output) -> Result<()> {
    match cmd {
        PluginCommands::List => list_plugins(config, output),
        PluginCommands::Methods { name } => show_methods(config, output, &name),
        PluginCommands::Call { plugin, method, params } => {
            call_method(config, output, &plugin, &method, &params)
        }
    }
}

fn make_loader(config: &Config) -> Result<PluginLoader> {
    PluginLoader::new(config.plugins_dir()?)
}

fn list_plugins(config: &Config, output: &Output) -> Result<()> {
    let loader = make_loader(config)?;
    let manager = loader.manager();

    if output.is_json() {
        let loaded: Vec<_> = manager
            .list_plugins()
            .into_iter()
            .map(|name| {
                serde_json::json!({
                    "name": name,
                    "methods": manager.list_plugin_methods(name).unwrap_or_default(),
                })
            })
            .collect();
        let failed: Vec<_> = loader
            .report()
            .failures()
            .map(|outcome| match outcome {
                LoadOutcome::InitFailed { plugin, error } => serde_json::json!({
                    "name": plugin, "loaded": true, "error": error,
                }),
                LoadOutcome::Failed { plugin, error } => serde_json::json!({
                    "name": plugin, "loaded": false, "error": error,
                }),
                LoadOutcome::Loaded { plugin } => serde_json::json!({"name": plugin}),
            })
            .collect();
        output.data(&serde_json::json!({"loaded": loaded, "failed": failed}));
        return Ok(());
    }

    let plugins = manager.list_plugins();
    if plugins.is_empty() {
        println!("No plugins loaded.");
        println!();
        println!(
            "Plugins are discovered from manifest files in {}",
            loader.plugins_dir().display()
        );
        return Ok(());
    }

    println!("Loaded plugins:");
    println!("{:<20} {}", "NAME", "METHODS");
    println!("{}", "-".repeat(70));
    for name in plugins {
        let methods = manager.list_plugin_methods(name).unwrap_or_default();
        println!("{:<20} {}", name, methods.join(", "));
    }

    let failures: Vec<_> = loader.report().failures().collect();
    if !failures.is_empty() {
        println!();
        println!("Problems:");
        for outcome in failures {
            match outcome {
                LoadOutcome::InitFailed { plugin, error } => {
                    println!("  {} (initialize failed: {})", plugin, error);
                }
                LoadOutcome::Failed { plugin, error } => {
                    println!("  {} (not loaded: {})", plugin, error);
                }
                LoadOutcome::Loaded { .. } => {}
            }
        }
    }

    Ok(())
}

fn show_methods(config: &Config, output: &Output, name: &str) -> Result<()> {
    let loader = make_loader(config)?;
    let methods = loader.manager().list_plugin_methods(name)?;

    if output.is_json() {
        output.data(&serde_json::json!({"name": name, "methods": methods}));
    } else {
        for method in methods {
            println!("{}", method);
        }
    }

    Ok(())
}

fn call_method(
    config: &Config,
    output: &Output,
    plugin: &str,
    method: &str,
    params: &str,
) -> Result<()> {
    let params: serde_json::Value =
        serde_json::from_str(params).context("Invalid --params JSON")?;

    let loader = make_loader(config)?;
    let namespace = loader
        .plugin(plugin)
        .ok_or_else(|| anyhow!("Unknown plugin: {}", plugin))?;

    let result = namespace.call(method, params)?;

    if output.is_json() {
        output.data(&serde_json::json!({"plugin": plugin, "method": method, "result": result}));
    } else {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}
