//! agentshift - Convert AI agent configuration between tool formats
//!
//! Prompts, rules and skills written for one coding agent (Cursor rules,
//! Claude Code memory and commands, ...) are discovered as
//! [`CustomizationItem`]s by a source plugin, passed through a
//! [`transform::Pipeline`] that keeps cross-file path references valid, and
//! emitted by a target plugin.

pub mod cli;
pub mod convert;
pub mod domain;
pub mod plugin;
pub mod storage;
pub mod transform;
pub mod workspace;

pub use convert::{Conversion, ConversionReport};
pub use domain::{CustomizationItem, ItemKind, ItemPayload, Warning, WarningCode};
pub use plugin::{ConversionPlugin, PluginRegistry};
