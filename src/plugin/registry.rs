//! Plugin registry
//!
//! In-memory catalog mapping a plugin ID to its implementation and
//! registration metadata. The registry is an explicitly owned value: build
//! one per run and pass it to whatever needs it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::traits::ConversionPlugin;

/// Where a registered plugin came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginOrigin {
    /// Compiled into agentshift
    Builtin,

    /// Found on disk by plugin discovery
    Discovered,
}

impl std::fmt::Display for PluginOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginOrigin::Builtin => write!(f, "builtin"),
            PluginOrigin::Discovered => write!(f, "discovered"),
        }
    }
}

/// A plugin plus metadata, before it is stamped by the registry
pub struct NewRegistration {
    pub plugin: Arc<dyn ConversionPlugin>,
    pub origin: PluginOrigin,
    pub version: Option<String>,
    pub install_path: Option<PathBuf>,
}

impl NewRegistration {
    /// Registration for a built-in plugin
    pub fn builtin(plugin: Arc<dyn ConversionPlugin>) -> Self {
        let version = plugin.version().map(str::to_string);
        Self {
            plugin,
            origin: PluginOrigin::Builtin,
            version,
            install_path: None,
        }
    }
}

/// A stored registration
#[derive(Clone)]
pub struct PluginRegistration {
    pub plugin: Arc<dyn ConversionPlugin>,
    pub origin: PluginOrigin,
    pub registered_at: DateTime<Utc>,
    pub version: Option<String>,
    pub install_path: Option<PathBuf>,
}

impl PluginRegistration {
    /// The registered plugin's ID
    pub fn id(&self) -> &str {
        self.plugin.id()
    }
}

impl std::fmt::Debug for PluginRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistration")
            .field("id", &self.plugin.id())
            .field("origin", &self.origin)
            .field("registered_at", &self.registered_at)
            .field("version", &self.version)
            .field("install_path", &self.install_path)
            .finish()
    }
}

/// Registry of conversion plugins
#[derive(Default)]
pub struct PluginRegistry {
    /// Registrations in registration order
    entries: Vec<PluginRegistration>,

    /// Plugin ID to index in `entries`
    index: HashMap<String, usize>,
}

impl PluginRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in plugins
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for plugin in super::builtin::builtins() {
            registry.register(NewRegistration::builtin(plugin));
        }
        registry
    }

    /// Registers a plugin, replacing any entry with the same ID
    ///
    /// A replaced entry keeps its position in [`list`](Self::list).
    pub fn register(&mut self, registration: NewRegistration) {
        let id = registration.plugin.id().to_string();
        let entry = PluginRegistration {
            plugin: registration.plugin,
            origin: registration.origin,
            registered_at: Utc::now(),
            version: registration.version,
            install_path: registration.install_path,
        };

        match self.index.get(&id) {
            Some(&pos) => {
                log::debug!("Replacing plugin registration '{}'", id);
                self.entries[pos] = entry;
            }
            None => {
                log::debug!("Registering plugin '{}' ({})", id, entry.origin);
                self.index.insert(id, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Gets a registration by plugin ID
    pub fn get(&self, id: &str) -> Option<&PluginRegistration> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    /// Gets the plugin instance by ID
    pub fn get_instance(&self, id: &str) -> Option<Arc<dyn ConversionPlugin>> {
        self.get(id).map(|r| Arc::clone(&r.plugin))
    }

    /// Checks whether a plugin ID is registered
    pub fn has(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Lists all registrations in registration order
    pub fn list(&self) -> &[PluginRegistration] {
        &self.entries
    }

    /// Lists registrations with the given origin
    pub fn list_by_origin(&self, origin: PluginOrigin) -> Vec<&PluginRegistration> {
        self.entries.iter().filter(|r| r.origin == origin).collect()
    }

    /// Removes every registration
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
