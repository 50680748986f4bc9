//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init` | Create `.agentshift/` with a default config |
//! | `convert` | Convert items between tool formats |
//! | `discover` | List the items a plugin finds |
//! | `plugin list`, `plugin show` | Inspect available plugins |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logging:
//! ```bash
//! agentshift --verbose convert --from cursor --to claude --dry-run
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod convert_cmd;
mod discover_cmd;
mod output;
mod plugin_cmd;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
