//! Plugin error types

use std::path::PathBuf;

use thiserror::Error;

use crate::workspace::WorkspaceError;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error("Plugin '{plugin}' failed: {message}")]
    Failed { plugin: String, message: String },

    #[error("Failed to run plugin executable {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid response from plugin '{plugin}': {message}")]
    Protocol { plugin: String, message: String },
}

impl PluginError {
    pub fn failed(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        PluginError::Failed {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    pub fn protocol(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        PluginError::Protocol {
            plugin: plugin.into(),
            message: message.into(),
        }
    }
}
