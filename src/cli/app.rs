//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{convert_cmd, discover_cmd, plugin_cmd};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "agentshift")]
#[command(author, version, about = "Convert agent prompts, rules and skills between tool formats")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging (RUST_LOG is honored otherwise)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize agentshift configuration in a directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Convert items from one tool format to another
    Convert(convert_cmd::ConvertArgs),

    /// List the items a plugin finds in a directory
    Discover(discover_cmd::DiscoverArgs),

    /// Manage plugins
    #[command(subcommand)]
    Plugin(plugin_cmd::PluginCommands),
}

fn init_logging(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load()?;
    let format = cli.format.unwrap_or_else(|| config.global.default_format.into());
    let output = Output::new(format);

    log::debug!(
        "agentshift {} starting, project root: {:?}",
        env!("CARGO_PKG_VERSION"),
        config.project_root
    );

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.success(&format!(
                "Initialized agentshift project at {}",
                project.root().display()
            ));
        }

        Commands::Convert(args) => convert_cmd::run(args, &config, &output)?,
        Commands::Discover(args) => discover_cmd::run(args, &config, &output)?,
        Commands::Plugin(cmd) => plugin_cmd::run(cmd, &config, &output)?,
    }

    log::debug!("Command completed successfully");
    Ok(())
}
