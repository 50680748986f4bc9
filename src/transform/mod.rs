//! Content transformations between discovery and emission
//!
//! A [`Pipeline`] runs its [`Transformation`]s in declared order. Each stage
//! sees the previous stage's items through a [`TransformContext`], which
//! also lets it ask the target plugin what an emission *would* produce via
//! [`TransformContext::trial_emit`].

mod path_rewriter;

pub use path_rewriter::{
    build_mapping, detect_orphans, rewrite_content, PathMapping, PathRewriteTransformation,
    RewriteOutcome,
};

use crate::domain::{CustomizationItem, EmitOptions, EmitResult, Warning};
use crate::plugin::{ConversionPlugin, PluginError};
use crate::workspace::Workspace;

/// Everything a transformation stage can look at
pub struct TransformContext<'a> {
    pub items: &'a [CustomizationItem],
    pub source: &'a dyn ConversionPlugin,
    pub target: &'a dyn ConversionPlugin,
    pub source_workspace: &'a dyn Workspace,
    pub target_workspace: &'a dyn Workspace,
    pub emit_options: &'a EmitOptions,
}

impl TransformContext<'_> {
    /// Runs the target plugin's emission as a dry run
    ///
    /// Keeps the caller's `force` setting so collision handling matches the
    /// real emission.
    pub fn trial_emit(&self, items: &[CustomizationItem]) -> Result<EmitResult, PluginError> {
        self.target
            .emit(items, self.target_workspace, &self.emit_options.trial())
    }
}

/// Output of one stage
#[derive(Debug, Clone, Default)]
pub struct TransformOutput {
    pub items: Vec<CustomizationItem>,
    pub warnings: Vec<Warning>,
}

/// One step of the pipeline
pub trait Transformation {
    fn name(&self) -> &str;

    fn apply(&self, ctx: &TransformContext<'_>) -> Result<TransformOutput, PluginError>;
}

/// Ordered list of transformations
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Transformation>>,
}

impl Pipeline {
    /// An empty pipeline that passes items through untouched
    pub fn new() -> Self {
        Self::default()
    }

    /// The default pipeline: path rewriting
    pub fn standard(detect_orphans: bool) -> Self {
        Self::new().with(PathRewriteTransformation::new(detect_orphans))
    }

    /// Appends a stage
    pub fn with(mut self, stage: impl Transformation + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Stage names in run order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs every stage, feeding each one the previous stage's items
    pub fn run(
        &self,
        items: &[CustomizationItem],
        source: &dyn ConversionPlugin,
        target: &dyn ConversionPlugin,
        source_workspace: &dyn Workspace,
        target_workspace: &dyn Workspace,
        emit_options: &EmitOptions,
    ) -> Result<TransformOutput, PluginError> {
        let mut current = items.to_vec();
        let mut warnings = Vec::new();

        for stage in &self.stages {
            let ctx = TransformContext {
                items: &current,
                source,
                target,
                source_workspace,
                target_workspace,
                emit_options,
            };

            let output = stage.apply(&ctx)?;
            log::debug!(
                "transform {}: {} item(s), {} warning(s)",
                stage.name(),
                output.items.len(),
                output.warnings.len()
            );

            current = output.items;
            warnings.extend(output.warnings);
        }

        Ok(TransformOutput {
            items: current,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemPayload, WarningCode};
    use crate::plugin::CursorPlugin;
    use crate::workspace::FsWorkspace;
    use tempfile::TempDir;

    /// Appends a marker to every item and emits one warning
    struct Mark(&'static str);

    impl Transformation for Mark {
        fn name(&self) -> &str {
            self.0
        }

        fn apply(&self, ctx: &TransformContext<'_>) -> Result<TransformOutput, PluginError> {
            Ok(TransformOutput {
                items: ctx
                    .items
                    .iter()
                    .map(|i| i.with_content(format!("{}{}", i.content, self.0)))
                    .collect(),
                warnings: vec![Warning::new(WarningCode::Approximated, self.0)],
            })
        }
    }

    struct Fails;

    impl Transformation for Fails {
        fn name(&self) -> &str {
            "fails"
        }

        fn apply(&self, _ctx: &TransformContext<'_>) -> Result<TransformOutput, PluginError> {
            Err(PluginError::failed("fails", "boom"))
        }
    }

    fn run(
        pipeline: &Pipeline,
        items: &[CustomizationItem],
    ) -> Result<TransformOutput, PluginError> {
        let dir = TempDir::new().unwrap();
        let ws = FsWorkspace::read_only(dir.path());
        let plugin = CursorPlugin::new();
        pipeline.run(items, &plugin, &plugin, &ws, &ws, &EmitOptions::default())
    }

    #[test]
    fn empty_pipeline_passes_through() {
        let items = vec![CustomizationItem::new("a", ItemPayload::GlobalPrompt, "x", "a.md")];
        let output = run(&Pipeline::new(), &items).unwrap();
        assert_eq!(output.items, items);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn stages_run_in_order_and_warnings_accumulate() {
        let pipeline = Pipeline::new().with(Mark("1")).with(Mark("2"));
        assert_eq!(pipeline.stage_names(), vec!["1", "2"]);

        let items = vec![CustomizationItem::new("a", ItemPayload::GlobalPrompt, "x", "a.md")];
        let output = run(&pipeline, &items).unwrap();

        assert_eq!(output.items[0].content, "x12");
        let messages: Vec<&str> = output.warnings.iter().map(|w| w.message.as_str()).collect();
        assert_eq!(messages, vec!["1", "2"]);
    }

    #[test]
    fn stage_error_stops_the_pipeline() {
        let pipeline = Pipeline::new().with(Fails).with(Mark("never"));
        assert!(run(&pipeline, &[]).is_err());
    }

    #[test]
    fn trial_emit_does_not_write() {
        let dir = TempDir::new().unwrap();
        let ws = FsWorkspace::new(dir.path());
        let plugin = CursorPlugin::new();
        let items = vec![CustomizationItem::new("a", ItemPayload::GlobalPrompt, "x", "a.md")];
        let ctx = TransformContext {
            items: &items,
            source: &plugin,
            target: &plugin,
            source_workspace: &ws,
            target_workspace: &ws,
            emit_options: &EmitOptions::default(),
        };

        let result = ctx.trial_emit(&items).unwrap();
        assert_eq!(result.written.len(), 1);
        assert!(!ws.exists(".cursor/rules/a.mdc"));
    }

    #[test]
    fn standard_pipeline_has_path_rewrite() {
        assert_eq!(Pipeline::standard(true).stage_names(), vec!["path-rewrite"]);
    }
}
