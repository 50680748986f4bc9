//! Filesystem workspace capability
//!
//! Plugins read and write through a [`Workspace`] rooted at a directory.
//! Paths are always relative to the root and use `/` separators; paths
//! that would escape the root are rejected.

use std::fs;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Path escapes the workspace root: {0}")]
    OutsideRoot(String),

    #[error("Workspace is read-only, refusing to modify {0}")]
    ReadOnly(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl WorkspaceError {
    fn io(path: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            WorkspaceError::NotFound(path.to_string())
        } else {
            WorkspaceError::Io {
                path: path.to_string(),
                source,
            }
        }
    }
}

/// Entry returned by [`Workspace::readdir`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Filesystem access relative to a root directory
pub trait Workspace {
    /// Returns the workspace root
    fn root(&self) -> &Path;

    /// Resolves a relative path to an absolute one under the root
    fn resolve(&self, path: &str) -> Result<PathBuf, WorkspaceError>;

    /// Checks whether a path exists
    fn exists(&self, path: &str) -> bool;

    /// Reads a file as UTF-8 text
    fn read(&self, path: &str) -> Result<String, WorkspaceError>;

    /// Writes a file, creating missing parent directories
    fn write(&self, path: &str, content: &str) -> Result<(), WorkspaceError>;

    /// Lists a directory, sorted by name
    fn readdir(&self, path: &str) -> Result<Vec<DirEntry>, WorkspaceError>;

    /// Creates a directory and its parents
    fn mkdir(&self, path: &str) -> Result<(), WorkspaceError>;
}

/// Workspace backed by the real filesystem
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
    read_only: bool,
}

impl FsWorkspace {
    /// Creates a writable workspace
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            read_only: false,
        }
    }

    /// Creates a workspace whose `write` and `mkdir` always fail
    pub fn read_only(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            read_only: true,
        }
    }

    fn check_writable(&self, path: &str) -> Result<(), WorkspaceError> {
        if self.read_only {
            return Err(WorkspaceError::ReadOnly(path.to_string()));
        }
        Ok(())
    }
}

impl Workspace for FsWorkspace {
    fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, WorkspaceError> {
        let relative = Path::new(path);
        let mut resolved = self.root.clone();
        let mut depth = 0usize;

        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    if depth == 0 {
                        return Err(WorkspaceError::OutsideRoot(path.to_string()));
                    }
                    resolved.pop();
                    depth -= 1;
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(WorkspaceError::OutsideRoot(path.to_string()));
                }
            }
        }

        Ok(resolved)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.exists()).unwrap_or(false)
    }

    fn read(&self, path: &str) -> Result<String, WorkspaceError> {
        let full = self.resolve(path)?;
        fs::read_to_string(&full).map_err(|e| WorkspaceError::io(path, e))
    }

    fn write(&self, path: &str, content: &str) -> Result<(), WorkspaceError> {
        self.check_writable(path)?;
        let full = self.resolve(path)?;

        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| WorkspaceError::io(path, e))?;
        }

        // Write to a sibling temp file first, then rename into place
        let mut temp_name = full.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        fs::write(&temp_path, content).map_err(|e| WorkspaceError::io(path, e))?;
        fs::rename(&temp_path, &full).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            WorkspaceError::io(path, e)
        })
    }

    fn readdir(&self, path: &str) -> Result<Vec<DirEntry>, WorkspaceError> {
        let full = self.resolve(path)?;
        let mut entries = Vec::new();

        for entry in fs::read_dir(&full).map_err(|e| WorkspaceError::io(path, e))? {
            let entry = entry.map_err(|e| WorkspaceError::io(path, e))?;
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            entries.push(DirEntry { name, is_dir });
        }

        entries.sort();
        Ok(entries)
    }

    fn mkdir(&self, path: &str) -> Result<(), WorkspaceError> {
        self.check_writable(path)?;
        let full = self.resolve(path)?;
        fs::create_dir_all(&full).map_err(|e| WorkspaceError::io(path, e))
    }
}

/// Joins relative workspace path segments with `/`
pub fn join(base: &str, name: &str) -> String {
    if base.is_empty() || base == "." {
        name.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), name)
    }
}
