//! The contract every conversion plugin implements

use serde::{Deserialize, Serialize};

use super::error::PluginError;
use crate::domain::{CustomizationItem, DiscoverResult, EmitOptions, EmitResult, ItemKind};
use crate::workspace::Workspace;

/// Hints describing what a path reference in this tool's format looks like
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPatterns {
    /// Directory prefixes, e.g. `.cursor/rules/`
    pub prefixes: Vec<String>,

    /// File extensions without the leading dot, e.g. `mdc`
    pub extensions: Vec<String>,
}

impl PathPatterns {
    pub fn new<P, E>(prefixes: P, extensions: E) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }
}

/// A plugin that knows one tool's on-disk format
///
/// `emit` is the single emission entry point. With `options.dry_run` set it
/// must report the same `written`/`unsupported` classification as a real
/// run while performing no filesystem mutation.
pub trait ConversionPlugin: Send + Sync {
    /// Unique plugin identifier (e.g. `cursor`)
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Plugin version, if known
    fn version(&self) -> Option<&str> {
        None
    }

    /// Item kinds this plugin can discover and emit
    fn supported_kinds(&self) -> &[ItemKind];

    /// Discovers all items under the workspace root
    ///
    /// Either returns a complete result or fails; never a partial list.
    fn discover(&self, workspace: &dyn Workspace) -> Result<DiscoverResult, PluginError>;

    /// Emits items into the workspace
    fn emit(
        &self,
        items: &[CustomizationItem],
        workspace: &dyn Workspace,
        options: &EmitOptions,
    ) -> Result<EmitResult, PluginError>;

    /// Path reference hints used by orphan detection
    fn path_patterns(&self) -> Option<PathPatterns> {
        None
    }
}
