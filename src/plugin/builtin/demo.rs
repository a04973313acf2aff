//! Demo plugin
//!
//! A minimal plugin used to exercise the loader end to end. Not seeded by
//! `guildtrack init`; drop a `demo.toml` into the plugins directory to
//! enable it.

use std::path::Path;

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use super::{required, required_str};
use crate::plugin::manifest::PluginManifest;
use crate::plugin::method::Plugin;
use crate::plugin::registry::MethodRegistry;

pub const NAME: &str = "demo";

pub fn register(registry: &MethodRegistry) {
    registry.register(NAME, "greet");
    registry.register(NAME, "add");
}

pub fn build(_manifest: &PluginManifest, _path: &Path) -> Result<Plugin> {
    Ok(Plugin::new(NAME)
        .with_method("greet", |params| {
            let name = required_str(&params, "name")?;
            let message = format!("Hello, {name}! This is the demo plugin.");
            tracing::info!("{message}");
            Ok(Value::String(message))
        })
        .with_method("add", |params| {
            let a = required(&params, "a")?;
            let b = required(&params, "b")?;
            let sum = match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => json!(a + b),
                _ => {
                    let a = a
                        .as_f64()
                        .ok_or_else(|| anyhow!("parameter 'a' must be numeric"))?;
                    let b = b
                        .as_f64()
                        .ok_or_else(|| anyhow!("parameter 'b' must be numeric"))?;
                    json!(a + b)
                }
            };
            Ok(sum)
        })
        .with_initialize(|| {
            tracing::info!("demo plugin initialized");
            Ok(())
        }))
}
