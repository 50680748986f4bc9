//! # Plugin System
//!
//! Every agent tool format is a [`ConversionPlugin`]: it can discover the
//! customization items stored in a directory and emit items back out in its
//! own layout.
//!
//! ## Plugin Sources
//!
//! | Origin | Where | Notes |
//! |--------|-------|-------|
//! | Built-in | compiled in | `cursor`, `claude` |
//! | Discovered | `agentshift-plugin-{name}` executables | found by [`PluginDiscovery`] |
//!
//! ## Plugin Discovery
//!
//! Executables are searched for in:
//! 1. `.agentshift/plugins/` - Project-local plugins
//! 2. `<config dir>/plugins/` - User-wide plugins
//! 3. `plugin_dirs` from the config files
//! 4. `$PATH` - System-wide plugins
//!
//! ## Protocol
//!
//! ```text
//! CLI                          Plugin Binary
//!  │                               │
//!  ├── Spawn: agentshift-plugin-windsurf
//!  │                               │
//!  ├── Stdin: {"operation": "discover", "params": {"root": "..."}}
//!  │                               │
//!  └── Stdout: {"success": true, "data": {"items": [...]}}
//! ```
//!
//! Every plugin must support `--manifest` to declare its capabilities.
//!
//! ## Key Types
//!
//! - [`PluginRegistry`] - Plugins available to a conversion, by id
//! - [`PluginDiscovery`] - Finds and validates external plugins
//! - [`PluginLoader`] - Resolves id conflicts and registers discoveries
//! - [`ExternalPlugin`] - Adapter that speaks the JSON protocol

pub mod builtin;
mod discovery;
mod error;
mod external;
mod loader;
mod protocol;
mod registry;
mod traits;

pub use builtin::{builtins, ClaudePlugin, CursorPlugin};
pub use discovery::{
    DiscoveredPlugin, DiscoveryError, DiscoveryReport, PluginDiscovery, PLUGIN_PREFIX,
};
pub use error::PluginError;
pub use external::ExternalPlugin;
pub use loader::{ConflictStrategy, LoadOutcome, LoaderError, PluginLoader, SkippedPlugin};
pub use protocol::{
    validate_manifest, PluginManifest, PluginRequest, PluginResponse, REQUIRED_OPERATIONS,
};
pub use registry::{NewRegistration, PluginOrigin, PluginRegistration, PluginRegistry};
pub use traits::{ConversionPlugin, PathPatterns};
