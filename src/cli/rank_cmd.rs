//! Battle ranking pipeline
//!
//! Runs entirely through the plugin surface: battle records via
//! `file_utils`, the roster via `members_utils`, scoring via
//! `rank_utils`, output again via `file_utils`.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde_json::json;

use super::output::Output;
use crate::config::Config;
use crate::plugin::{PluginLoader, PluginNamespace};

pub fn run(
    input: Option<PathBuf>,
    out_file: Option<PathBuf>,
    config: &Config,
    output: &Output,
) -> Result<()> {
    let root = config.require_project_root()?.to_path_buf();
    let loader = PluginLoader::new(config.plugins_dir()?)?;

    let input_dir = input.unwrap_or_else(|| root.join(&config.project.input_dir));
    let out_path = out_file.unwrap_or_else(|| root.join(&config.project.output_file));

    let file_utils = require_plugin(&loader, "file_utils")?;
    let members_utils = require_plugin(&loader, "members_utils")?;
    let rank_utils = require_plugin(&loader, "rank_utils")?;

    let records = file_utils.call(
        "load_json_files_from_folder",
        json!({"path": input_dir.display().to_string()}),
    )?;
    if records.as_array().map_or(true, |r| r.is_empty()) {
        output.error("No battle data loaded");
        return Ok(());
    }

    let members = members_utils.call("get_all_members", json!({}))?;
    let rankings = rank_utils.call(
        "calculate_rankings",
        json!({"records": records, "members": members}),
    )?;

    let payload = json!({
        "generated_at": Utc::now(),
        "rankings": rankings,
    });
    file_utils.call(
        "save_single_json",
        json!({"path": out_path.display().to_string(), "data": payload}),
    )?;

    if output.is_json() {
        output.data(&payload);
    } else {
        output.success(&format!("Rankings written to {}", out_path.display()));
    }

    Ok(())
}

fn require_plugin<'a>(loader: &'a PluginLoader, name: &str) -> Result<&'a PluginNamespace> {
    let namespace = loader
        .plugin(name)
        .ok_or_else(|| anyhow!("Plugin '{}' is not available; check the plugins directory", name))?;
    if namespace.is_empty() {
        return Err(anyhow!(
            "Plugin '{}' failed to load; run 'guildtrack plugin list' for details",
            name
        ));
    }
    Ok(namespace)
}
