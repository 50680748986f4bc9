//! Discovery and emission results exchanged with plugins

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::item::{CustomizationItem, ItemKind};
use super::warning::Warning;

/// Result of discovering items in a tool's native format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoverResult {
    pub items: Vec<CustomizationItem>,

    #[serde(default)]
    pub warnings: Vec<Warning>,
}

/// One file produced (or planned) by an emission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrittenFile {
    /// Output path, absolute or relative to the target root
    pub path: PathBuf,

    /// Kind of item(s) embodied by the file
    pub kind: ItemKind,

    /// Number of source items that contributed (more than one when merged)
    pub item_count: usize,

    /// True if the file is new, false if it replaces an existing one
    pub created: bool,

    /// Source items that produced this file
    #[serde(default)]
    pub sources: Vec<CustomizationItem>,
}

/// Result of an emission (real or dry run)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmitResult {
    pub written: Vec<WrittenFile>,

    #[serde(default)]
    pub warnings: Vec<Warning>,

    /// Items the target format cannot represent
    #[serde(default)]
    pub unsupported: Vec<CustomizationItem>,
}

/// Options controlling an emission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitOptions {
    /// Compute the result without touching the filesystem
    #[serde(default)]
    pub dry_run: bool,

    /// Overwrite existing files instead of writing alongside them
    #[serde(default)]
    pub force: bool,
}

impl EmitOptions {
    /// Options for a trial emission derived from these options
    pub fn trial(self) -> Self {
        Self {
            dry_run: true,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_options_keep_force() {
        let options = EmitOptions {
            dry_run: false,
            force: true,
        };
        let trial = options.trial();
        assert!(trial.dry_run);
        assert!(trial.force);
    }

    #[test]
    fn emit_result_defaults_missing_lists() {
        let json = serde_json::json!({ "written": [] });
        let result: EmitResult = serde_json::from_value(json).unwrap();
        assert!(result.warnings.is_empty());
        assert!(result.unsupported.is_empty());
    }
}
