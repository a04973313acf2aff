//! Configuration handling for guildtrack
//!
//! Configuration is stored in `.guildtrack/config.toml` (project) and
//! `~/.config/guildtrack/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory scanned for plugin manifests, relative to the project root
    pub plugins_dir: PathBuf,

    /// Folder with battle result JSON files for `rank`
    pub input_dir: PathBuf,

    /// Output file written by `rank`
    pub output_file: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            plugins_dir: PathBuf::from(".guildtrack/plugins"),
            input_dir: PathBuf::from("input/battle"),
            output_file: PathBuf::from("output/battle/grouped_rank_score.json"),
        }
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let (project, project_root) = Self::load_project()?;

        Ok(Self { project, global, project_root })
    }

    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "guildtrack", "guildtrack")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    fn load_project() -> Result<(ProjectConfig, Option<PathBuf>)> {
        match Self::find_project_root() {
            Some(root) => {
                let config = Self::load_project_config(&root)?;
                Ok((config, Some(root)))
            }
            None => Ok((ProjectConfig::default(), None)),
        }
    }

    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(".guildtrack").join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")
    }

    /// Finds the project root by looking for a `.guildtrack/` directory
    pub fn find_project_root() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            if current.join(".guildtrack").is_dir() {
                return Some(current);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns the project root, or an error if not in a project
    pub fn require_project_root(&self) -> Result<&Path> {
        self.project_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a guildtrack project. Run 'guildtrack init' first."))
    }

    /// The plugins directory resolved against the project root
    pub fn plugins_dir(&self) -> Result<PathBuf> {
        Ok(self.require_project_root()?.join(&self.project.plugins_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_project_config() {
        let config = ProjectConfig::default();

        assert_eq!(config.plugins_dir, PathBuf::from(".guildtrack/plugins"));
        assert_eq!(config.input_dir, PathBuf::from("input/battle"));
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
plugins_dir = "helpers"
input_dir = "data/battles"
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.plugins_dir, PathBuf::from("helpers"));
        assert_eq!(config.input_dir, PathBuf::from("data/battles"));
        // unspecified fields keep their defaults
        assert_eq!(
            config.output_file,
            PathBuf::from("output/battle/grouped_rank_score.json")
        );
    }

    #[test]
    fn parse_global_config() {
        let config: GlobalConfig = toml::from_str(r#"default_format = "json""#).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
    }

    #[test]
    fn config_not_in_project() {
        let config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: None,
        };

        assert!(config.require_project_root().is_err());
        assert!(config.plugins_dir().is_err());
    }

    #[test]
    fn for_project_reads_project_config() {
        let dir = TempDir::new().unwrap();
        let meta_dir = dir.path().join(".guildtrack");
        fs::create_dir_all(&meta_dir).unwrap();
        fs::write(meta_dir.join("config.toml"), r#"plugins_dir = "helpers""#).unwrap();

        let config = Config::for_project(dir.path()).unwrap();

        assert_eq!(config.project.plugins_dir, PathBuf::from("helpers"));
        assert_eq!(config.plugins_dir().unwrap(), dir.path().join("helpers"));
    }
}
