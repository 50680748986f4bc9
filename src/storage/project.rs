//! Project management
//!
//! Handles project initialization and locating project directories.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::PROJECT_DIR;
use super::Config;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in an agentshift project. Run 'agentshift init' first.")]
    NotInProject,
}

const DEFAULT_CONFIG: &str = r#"# agentshift configuration

# Extra directories searched for agentshift-plugin-* executables
plugin_dirs = []

# Also search $PATH for plugins
scan_path = true

# When a discovered plugin reuses an id: prefer_existing, prefer_discovered or fail
conflict_strategy = "prefer_existing"

# Rewrite path references so they point at converted files
rewrite_paths = true

# Warn about path references that could not be rewritten
detect_orphans = true
"#;

/// An agentshift project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Initializes a new project at the given path
    ///
    /// Existing files are left alone, so running it twice is harmless.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(PROJECT_DIR);

        let plugins_dir = project_dir.join("plugins");
        fs::create_dir_all(&plugins_dir)
            .with_context(|| {
                format!("Failed to create plugins directory: {}", plugins_dir.display())
            })?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        log::debug!("Initialized project at {}", root.display());
        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the `.agentshift` directory path
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the plugins directory
    pub fn plugins_dir(&self) -> PathBuf {
        self.project_dir().join("plugins")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ProjectConfig;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.project_dir().is_dir());
        assert!(project.plugins_dir().is_dir());
        assert!(project.project_dir().join("config.toml").is_file());
    }

    #[test]
    fn default_config_file_parses_to_defaults() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert_eq!(project.config().project, ProjectConfig::default());
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        fs::write(dir.path().join(PROJECT_DIR).join("config.toml"), "scan_path = false\n").unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(!project.config().project.scan_path);
    }

    #[test]
    fn open_existing_project() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.root(), dir.path());
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Project::open(dir.path()).is_err());
    }
}
