//! # Storage Layer
//!
//! Project configuration and layout.
//!
//! ## Project Structure
//!
//! ```text
//! .agentshift/
//! ├── config.toml           # Project configuration
//! └── plugins/              # Local plugins (agentshift-plugin-*)
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - An initialized agentshift project
//! - [`Config`] - Project and global configuration

mod config;
mod project;

pub use config::{
    Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, CONFIG_DIR_ENV, PROJECT_DIR,
};
pub use project::{Project, ProjectError};
