//! Plugin discovery
//!
//! Plugins are executables named `agentshift-plugin-{name}` found in:
//! 1. `.agentshift/plugins/` (project-local)
//! 2. `<config dir>/plugins/` (user-wide)
//! 3. directories listed in `plugin_dirs` in the config
//! 4. `$PATH`, when enabled
//!
//! Each candidate is asked for its manifest with `--manifest`; the manifest
//! is checked against the plugin shape before the plugin is accepted. A bad
//! package is reported as a [`DiscoveryError`] and never stops the scan.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use super::external::ExternalPlugin;
use super::protocol::{validate_manifest, PluginManifest};

/// File name prefix that marks an executable as an agentshift plugin
pub const PLUGIN_PREFIX: &str = "agentshift-plugin-";

/// A plugin found on disk whose manifest passed validation
#[derive(Debug, Clone)]
pub struct DiscoveredPlugin {
    pub manifest: PluginManifest,
    pub path: PathBuf,
}

impl DiscoveredPlugin {
    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    /// Builds the plugin adapter for this package
    pub fn instantiate(&self) -> ExternalPlugin {
        ExternalPlugin::new(self.manifest.clone(), self.path.clone())
    }
}

/// A package that was found but could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryError {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of one discovery pass
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub plugins: Vec<DiscoveredPlugin>,
    pub errors: Vec<DiscoveryError>,
}

/// Scans search directories for plugin executables
#[derive(Debug, Clone, Default)]
pub struct PluginDiscovery {
    search_dirs: Vec<PathBuf>,
    scan_path: bool,
}

impl PluginDiscovery {
    /// Creates a discovery with no search directories
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory to search
    pub fn add_search_dir(&mut self, dir: impl Into<PathBuf>) {
        self.search_dirs.push(dir.into());
    }

    /// Also search every directory in `$PATH`
    pub fn scan_path(mut self, enabled: bool) -> Self {
        self.scan_path = enabled;
        self
    }

    /// Returns the directories that will be searched, in order
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = self.search_dirs.clone();

        if self.scan_path {
            if let Ok(path_var) = std::env::var("PATH") {
                dirs.extend(std::env::split_paths(&path_var));
            }
        }

        dirs
    }

    /// Discovers all plugins in the search directories
    pub fn discover(&self) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut seen_paths: HashSet<PathBuf> = HashSet::new();

        for dir in self.search_dirs() {
            for path in Self::scan_directory(&dir) {
                // The same directory can appear twice (e.g. config and PATH)
                if !seen_paths.insert(path.clone()) {
                    continue;
                }

                match Self::load(&path) {
                    Ok(manifest) => {
                        if seen_ids.insert(manifest.id.clone()) {
                            log::debug!(
                                "Discovered plugin '{}' at {}",
                                manifest.id,
                                path.display()
                            );
                            report.plugins.push(DiscoveredPlugin { manifest, path });
                        } else {
                            report.errors.push(DiscoveryError {
                                message: format!(
                                    "Duplicate plugin id '{}' (provided by an earlier package)",
                                    manifest.id
                                ),
                                path,
                            });
                        }
                    }
                    Err(message) => {
                        log::warn!("Skipping plugin {}: {}", path.display(), message);
                        report.errors.push(DiscoveryError { path, message });
                    }
                }
            }
        }

        report
    }

    /// Lists plugin candidates in a directory, sorted by file name
    fn scan_directory(dir: &Path) -> Vec<PathBuf> {
        if !dir.is_dir() {
            return Vec::new();
        }

        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                log::debug!("Ignoring unreadable plugin directory {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut candidates: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name.starts_with(PLUGIN_PREFIX) && !name.ends_with(".tmp"))
            })
            .filter(|path| is_executable(path))
            .collect();

        candidates.sort();
        candidates
    }

    /// Loads and validates the manifest of one candidate
    fn load(path: &Path) -> Result<PluginManifest, String> {
        let output = Command::new(path)
            .arg("--manifest")
            .output()
            .map_err(|e| format!("failed to execute: {}", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("--manifest exited with {}: {}", output.status, stderr.trim()));
        }

        let value: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| format!("manifest is not valid JSON: {}", e))?;

        validate_manifest(&value)
            .map_err(|problems| format!("invalid manifest: {}", problems.join("; ")))
    }
}

/// Checks if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = path.metadata() {
            return meta.is_file() && meta.permissions().mode() & 0o111 != 0;
        }
    }

    #[cfg(windows)]
    {
        if let Some(ext) = path.extension() {
            return ext == "exe" || ext == "bat" || ext == "cmd";
        }
    }

    false
}
