//! Project initialization

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use crate::config::ProjectConfig;

/// Manifests seeded into a fresh plugins directory
const SEED_MANIFESTS: &[(&str, &str)] = &[
    (
        "file_utils.toml",
        "name = \"file_utils\"\ndescription = \"JSON file helpers\"\n",
    ),
    (
        "members_utils.toml",
        "name = \"members_utils\"\ndescription = \"Member roster lookups\"\n\n[options]\nmembers_file = \"members.json\"\n",
    ),
    (
        "rank_utils.toml",
        "name = \"rank_utils\"\ndescription = \"Battle ranking calculation\"\n",
    ),
];

pub fn run(path: &str, output: &Output) -> Result<()> {
    let root = Path::new(path);
    let meta_dir = root.join(".guildtrack");
    let plugins_dir = meta_dir.join("plugins");

    fs::create_dir_all(&plugins_dir)
        .with_context(|| format!("Failed to create {}", plugins_dir.display()))?;

    let config_path = meta_dir.join("config.toml");
    if !config_path.exists() {
        let content = toml::to_string_pretty(&ProjectConfig::default())
            .context("Failed to serialize default config")?;
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
    }

    for (file_name, content) in SEED_MANIFESTS {
        let manifest_path = plugins_dir.join(file_name);
        if !manifest_path.exists() {
            fs::write(&manifest_path, content)
                .with_context(|| format!("Failed to write {}", manifest_path.display()))?;
        }
    }

    let members_path = plugins_dir.join("members.json");
    if !members_path.exists() {
        fs::write(&members_path, "{}\n")
            .with_context(|| format!("Failed to write {}", members_path.display()))?;
    }

    output.success(&format!(
        "Initialized guildtrack project at {}",
        root.display()
    ));
    Ok(())
}
