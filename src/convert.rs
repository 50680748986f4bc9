//! End-to-end conversion: discover, transform, emit

use serde::Serialize;

use crate::domain::{CustomizationItem, EmitOptions, Warning, WrittenFile};
use crate::plugin::{ConversionPlugin, PluginError};
use crate::transform::Pipeline;
use crate::workspace::Workspace;

/// Outcome of a conversion run
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub source: String,
    pub target: String,
    pub dry_run: bool,

    /// Number of items the source plugin found
    pub discovered: usize,

    pub written: Vec<WrittenFile>,
    pub unsupported: Vec<CustomizationItem>,

    /// Discovery, transformation and emission warnings, in that order
    pub warnings: Vec<Warning>,
}

impl ConversionReport {
    /// One-line human summary
    pub fn summary(&self) -> String {
        let verb = if self.dry_run { "Would write" } else { "Wrote" };
        let mut summary = format!(
            "{} {} file(s) from {} item(s) ({} -> {})",
            verb,
            self.written.len(),
            self.discovered,
            self.source,
            self.target
        );
        if !self.unsupported.is_empty() {
            summary.push_str(&format!(", {} unsupported", self.unsupported.len()));
        }
        if !self.warnings.is_empty() {
            summary.push_str(&format!(", {} warning(s)", self.warnings.len()));
        }
        summary
    }
}

/// A configured conversion between two plugins
pub struct Conversion<'a> {
    source: &'a dyn ConversionPlugin,
    target: &'a dyn ConversionPlugin,
    source_workspace: &'a dyn Workspace,
    target_workspace: &'a dyn Workspace,
    pipeline: Pipeline,
    options: EmitOptions,
}

impl<'a> Conversion<'a> {
    /// Creates a conversion with the standard pipeline and default options
    pub fn new(
        source: &'a dyn ConversionPlugin,
        target: &'a dyn ConversionPlugin,
        source_workspace: &'a dyn Workspace,
        target_workspace: &'a dyn Workspace,
    ) -> Self {
        Self {
            source,
            target,
            source_workspace,
            target_workspace,
            pipeline: Pipeline::standard(true),
            options: EmitOptions::default(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_options(mut self, options: EmitOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs the conversion
    ///
    /// With `dry_run` set the final emission is a dry run too and nothing
    /// is written.
    pub fn run(self) -> Result<ConversionReport, PluginError> {
        log::debug!(
            "Converting {} -> {} ({} -> {})",
            self.source.id(),
            self.target.id(),
            self.source_workspace.root().display(),
            self.target_workspace.root().display()
        );

        let discovered = self.source.discover(self.source_workspace)?;
        let mut warnings = discovered.warnings;
        let discovered_count = discovered.items.len();

        let transformed = self.pipeline.run(
            &discovered.items,
            self.source,
            self.target,
            self.source_workspace,
            self.target_workspace,
            &self.options,
        )?;
        warnings.extend(transformed.warnings);

        let emitted = self
            .target
            .emit(&transformed.items, self.target_workspace, &self.options)?;
        warnings.extend(emitted.warnings);

        Ok(ConversionReport {
            source: self.source.id().to_string(),
            target: self.target.id().to_string(),
            dry_run: self.options.dry_run,
            discovered: discovered_count,
            written: emitted.written,
            unsupported: emitted.unsupported,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WarningCode;
    use crate::plugin::{ClaudePlugin, CursorPlugin};
    use crate::workspace::FsWorkspace;
    use tempfile::TempDir;

    fn cursor_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let ws = FsWorkspace::new(dir.path());
        ws.write(
            ".cursor/rules/basics.mdc",
            "---\nalwaysApply: true\n---\nSee .cursor/rules/api.mdc for API rules.",
        )
        .unwrap();
        ws.write(".cursor/rules/api.mdc", "---\ndescription: API\n---\nValidate input.")
            .unwrap();
        ws.write(".cursorignore", ".env\n").unwrap();
        dir
    }

    #[test]
    fn cursor_to_claude_rewrites_references() {
        let src = cursor_project();
        let dst = TempDir::new().unwrap();
        let source_ws = FsWorkspace::read_only(src.path());
        let target_ws = FsWorkspace::new(dst.path());
        let (cursor, claude) = (CursorPlugin::new(), ClaudePlugin::new());

        let report = Conversion::new(&cursor, &claude, &source_ws, &target_ws).run().unwrap();

        assert_eq!(report.discovered, 3);
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.unsupported.len(), 1);
        assert!(report.warnings.iter().any(|w| w.code == WarningCode::Skipped));

        let memory = target_ws.read("CLAUDE.md").unwrap();
        assert!(memory.contains(".claude/commands/api.md"));
        assert!(!memory.contains(".cursor/rules/api.mdc"));
        assert!(target_ws.exists(".claude/commands/api.md"));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let src = cursor_project();
        let dst = TempDir::new().unwrap();
        let source_ws = FsWorkspace::read_only(src.path());
        let target_ws = FsWorkspace::new(dst.path());
        let (cursor, claude) = (CursorPlugin::new(), ClaudePlugin::new());

        let report = Conversion::new(&cursor, &claude, &source_ws, &target_ws)
            .with_options(EmitOptions {
                dry_run: true,
                force: false,
            })
            .run()
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.written.len(), 2);
        assert!(std::fs::read_dir(dst.path()).unwrap().next().is_none());
        assert!(report.summary().starts_with("Would write 2 file(s)"));
    }

    #[test]
    fn without_pipeline_references_are_kept() {
        let src = cursor_project();
        let dst = TempDir::new().unwrap();
        let source_ws = FsWorkspace::read_only(src.path());
        let target_ws = FsWorkspace::new(dst.path());
        let (cursor, claude) = (CursorPlugin::new(), ClaudePlugin::new());

        Conversion::new(&cursor, &claude, &source_ws, &target_ws)
            .with_pipeline(Pipeline::new())
            .run()
            .unwrap();

        let memory = target_ws.read("CLAUDE.md").unwrap();
        assert!(memory.contains(".cursor/rules/api.mdc"));
    }

    #[test]
    fn summary_mentions_warnings() {
        let report = ConversionReport {
            source: "cursor".to_string(),
            target: "claude".to_string(),
            dry_run: false,
            discovered: 1,
            written: Vec::new(),
            unsupported: Vec::new(),
            warnings: vec![Warning::new(WarningCode::Skipped, "x")],
        };
        assert_eq!(
            report.summary(),
            "Wrote 0 file(s) from 1 item(s) (cursor -> claude), 1 warning(s)"
        );
    }
}
