//! `agentshift discover`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::output::Output;
use super::plugin_cmd::load_plugins;
use crate::storage::Config;
use crate::workspace::FsWorkspace;

#[derive(Args)]
pub struct DiscoverArgs {
    /// Plugin id of the format to read
    #[arg(long)]
    pub from: String,

    /// Directory to read from
    #[arg(long, default_value = ".")]
    pub source: PathBuf,
}

pub fn run(args: DiscoverArgs, config: &Config, output: &Output) -> Result<()> {
    let plugins = load_plugins(config, config.project.conflict_strategy)?;
    let plugin = plugins.require(&args.from)?;

    let workspace = FsWorkspace::read_only(&args.source);
    let result = plugin
        .discover(&workspace)
        .with_context(|| format!("Discovery with '{}' failed", args.from))?;

    output.verbose_ctx(
        "discover",
        &format!("{} item(s) in {}", result.items.len(), args.source.display()),
    );

    if output.is_json() {
        output.data(&serde_json::json!({
            "plugin": plugin.id(),
            "items": result.items,
            "warnings": result.warnings,
        }));
        return Ok(());
    }

    if result.items.is_empty() {
        println!("No {} items found in {}", plugin.name(), args.source.display());
    } else {
        println!("{:<20} {:<14} {:<24} {}", "ID", "KIND", "NAME", "SOURCE");
        println!("{}", "-".repeat(80));
        for item in &result.items {
            println!(
                "{:<20} {:<14} {:<24} {}",
                item.id.to_string(),
                item.kind().to_string(),
                item.name,
                item.source_path.as_deref().unwrap_or("-")
            );
        }
    }

    output.warnings(&result.warnings);
    Ok(())
}
