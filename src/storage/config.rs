//! Configuration handling for agentshift
//!
//! Configuration is stored in `.agentshift/config.toml` (project) and
//! `~/.config/agentshift/config.toml` (global). Set `AGENTSHIFT_CONFIG_DIR`
//! to use a different global config directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plugin::{ConflictStrategy, PluginDiscovery};

/// Name of the per-project directory
pub const PROJECT_DIR: &str = ".agentshift";

/// Environment variable overriding the global config directory
pub const CONFIG_DIR_ENV: &str = "AGENTSHIFT_CONFIG_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Project-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Extra plugin directories, relative to the project root
    pub plugin_dirs: Vec<PathBuf>,

    /// Also look for plugins on `$PATH`
    pub scan_path: bool,

    /// What to do when a discovered plugin reuses a registered id
    pub conflict_strategy: ConflictStrategy,

    /// Rewrite path references during conversion
    pub rewrite_paths: bool,

    /// Warn about path references that were not converted
    pub detect_orphans: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            plugin_dirs: vec![],
            scan_path: true,
            conflict_strategy: ConflictStrategy::PreferExisting,
            rewrite_paths: true,
            detect_orphans: true,
        }
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Extra plugin directories searched for every project
    pub plugin_dirs: Vec<PathBuf>,
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
        let project_root = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::find_project_root_from(&cwd));

        let project = match &project_root {
            Some(root) => Self::load_project_config(root)?,
            None => ProjectConfig::default(),
        };

        Ok(Self {
            project,
            global,
            project_root,
        })
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
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Some(PathBuf::from(dir));
        }
        ProjectDirs::from("dev", "agentshift", "agentshift")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
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

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(PROJECT_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")
    }

    /// Finds the project root by looking for `.agentshift/` in `start` and its parents
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns true if we're in an agentshift project
    pub fn is_in_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Plugin search directories, in priority order
    ///
    /// Project plugins come first, then user-wide plugins, then the
    /// configured `plugin_dirs` (project before global).
    pub fn plugin_search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();

        if let Some(root) = &self.project_root {
            dirs.push(root.join(PROJECT_DIR).join("plugins"));
        }
        if let Some(global) = Self::global_config_dir() {
            dirs.push(global.join("plugins"));
        }
        for dir in &self.project.plugin_dirs {
            match &self.project_root {
                Some(root) if dir.is_relative() => dirs.push(root.join(dir)),
                _ => dirs.push(dir.clone()),
            }
        }
        dirs.extend(self.global.plugin_dirs.iter().cloned());

        dirs
    }

    /// Builds a plugin discovery for this configuration
    pub fn plugin_discovery(&self) -> PluginDiscovery {
        let mut discovery = PluginDiscovery::new().scan_path(self.project.scan_path);
        for dir in self.plugin_search_dirs() {
            discovery.add_search_dir(dir);
        }
        discovery
    }
}
