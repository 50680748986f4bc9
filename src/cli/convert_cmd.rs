//! `agentshift convert`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use super::output::Output;
use super::plugin_cmd::load_plugins;
use crate::convert::{Conversion, ConversionReport};
use crate::domain::EmitOptions;
use crate::plugin::ConflictStrategy;
use crate::storage::Config;
use crate::transform::Pipeline;
use crate::workspace::FsWorkspace;

#[derive(Args)]
pub struct ConvertArgs {
    /// Plugin id of the source format
    #[arg(long)]
    pub from: String,

    /// Plugin id of the target format
    #[arg(long)]
    pub to: String,

    /// Directory to read from
    #[arg(long, default_value = ".")]
    pub source: PathBuf,

    /// Directory to write to
    #[arg(long, default_value = ".")]
    pub target: PathBuf,

    /// Show what would be written without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Overwrite existing files instead of writing alongside them
    #[arg(long)]
    pub force: bool,

    /// Leave path references untouched
    #[arg(long)]
    pub no_rewrite: bool,

    /// Skip orphan reference warnings
    #[arg(long)]
    pub no_orphans: bool,

    /// How to handle discovered plugins that reuse a registered id
    #[arg(long, value_enum)]
    pub conflict_strategy: Option<ConflictStrategy>,
}

pub fn run(args: ConvertArgs, config: &Config, output: &Output) -> Result<()> {
    let strategy = args.conflict_strategy.unwrap_or(config.project.conflict_strategy);
    let plugins = load_plugins(config, strategy)?;
    let source = plugins.require(&args.from)?;
    let target = plugins.require(&args.to)?;

    if !args.source.is_dir() {
        anyhow::bail!("Source directory does not exist: {}", args.source.display());
    }

    let source_ws = FsWorkspace::read_only(&args.source);
    let target_ws = FsWorkspace::new(&args.target);

    let rewrite = config.project.rewrite_paths && !args.no_rewrite;
    let detect_orphans = config.project.detect_orphans && !args.no_orphans;
    let pipeline = if rewrite {
        Pipeline::standard(detect_orphans)
    } else {
        Pipeline::new()
    };

    output.verbose_ctx(
        "convert",
        &format!(
            "{} -> {}, rewrite={}, orphans={}, dry_run={}, force={}",
            args.from, args.to, rewrite, detect_orphans, args.dry_run, args.force
        ),
    );

    let report = Conversion::new(&*source, &*target, &source_ws, &target_ws)
        .with_pipeline(pipeline)
        .with_options(EmitOptions {
            dry_run: args.dry_run,
            force: args.force,
        })
        .run()
        .with_context(|| format!("Conversion from {} to {} failed", args.from, args.to))?;

    print_report(output, &report, &args.target);
    Ok(())
}

fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

fn print_report(output: &Output, report: &ConversionReport, target_root: &Path) {
    if output.is_json() {
        let written: Vec<_> = report
            .written
            .iter()
            .map(|w| {
                let sources: Vec<&str> =
                    w.sources.iter().filter_map(|s| s.source_path.as_deref()).collect();
                serde_json::json!({
                    "path": display_path(&w.path, target_root),
                    "kind": w.kind,
                    "item_count": w.item_count,
                    "created": w.created,
                    "sources": sources,
                })
            })
            .collect();
        let unsupported: Vec<_> = report
            .unsupported
            .iter()
            .map(|i| serde_json::json!({ "id": i.id, "name": i.name, "kind": i.kind() }))
            .collect();

        output.data(&serde_json::json!({
            "source": report.source,
            "target": report.target,
            "dry_run": report.dry_run,
            "discovered": report.discovered,
            "written": written,
            "unsupported": unsupported,
            "warnings": report.warnings,
        }));
        return;
    }

    for file in &report.written {
        let action = match (report.dry_run, file.created) {
            (true, true) => "would create",
            (true, false) => "would update",
            (false, true) => "created",
            (false, false) => "updated",
        };
        println!(
            "  {:<13} {} ({} item{})",
            action,
            display_path(&file.path, target_root),
            file.item_count,
            if file.item_count == 1 { "" } else { "s" }
        );
    }

    output.warnings(&report.warnings);
    output.success(&report.summary());
}
