//! Plugin loading and conflict resolution
//!
//! Discovery, resolution and registration are separate steps:
//! [`PluginDiscovery`](super::PluginDiscovery) finds candidates,
//! [`PluginLoader::resolve`] decides which of them to accept against a
//! registry snapshot without touching it, and
//! [`PluginLoader::register_all`] performs the registration.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::discovery::DiscoveredPlugin;
use super::registry::{NewRegistration, PluginOrigin, PluginRegistry};

/// What to do when a discovered plugin's ID is already registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// Keep the registered plugin and skip the candidate
    #[default]
    PreferExisting,

    /// Accept the candidate; registering it replaces the existing entry
    PreferDiscovered,

    /// Abort resolution with an error
    Fail,
}

#[derive(Debug, Error, PartialEq)]
pub enum LoaderError {
    #[error(
        "Plugin '{id}' at {} conflicts with an already registered {existing} plugin",
        path.display()
    )]
    Conflict {
        id: String,
        path: PathBuf,
        existing: PluginOrigin,
    },
}

/// A candidate that was not accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPlugin {
    pub id: String,
    pub path: PathBuf,
    pub reason: String,
}

/// Result of conflict resolution
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Candidates to register
    pub loaded: Vec<DiscoveredPlugin>,

    /// Candidates skipped because of a conflict
    pub skipped: Vec<SkippedPlugin>,
}

/// Resolves discovered plugins against a registry
#[derive(Debug, Clone, Copy, Default)]
pub struct PluginLoader {
    strategy: ConflictStrategy,
}

impl PluginLoader {
    pub fn new(strategy: ConflictStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> ConflictStrategy {
        self.strategy
    }

    /// Decides which candidates to accept
    ///
    /// The registry is only read. Under [`ConflictStrategy::Fail`] the
    /// first conflict aborts the pass before later candidates are looked at.
    pub fn resolve(
        &self,
        registry: &PluginRegistry,
        candidates: Vec<DiscoveredPlugin>,
    ) -> Result<LoadOutcome, LoaderError> {
        let mut outcome = LoadOutcome::default();

        for candidate in candidates {
            let Some(existing) = registry.get(candidate.id()) else {
                outcome.loaded.push(candidate);
                continue;
            };

            match self.strategy {
                ConflictStrategy::PreferExisting => {
                    log::debug!(
                        "Skipping plugin '{}' at {}: already registered",
                        candidate.id(),
                        candidate.path.display()
                    );
                    outcome.skipped.push(SkippedPlugin {
                        id: candidate.id().to_string(),
                        reason: format!(
                            "Plugin id '{}' is already registered by a {} plugin",
                            candidate.id(),
                            existing.origin
                        ),
                        path: candidate.path,
                    });
                }
                ConflictStrategy::PreferDiscovered => {
                    log::debug!("Plugin '{}' will replace the registered one", candidate.id());
                    outcome.loaded.push(candidate);
                }
                ConflictStrategy::Fail => {
                    return Err(LoaderError::Conflict {
                        id: candidate.id().to_string(),
                        path: candidate.path,
                        existing: existing.origin,
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Registers every accepted candidate as a discovered plugin
    pub fn register_all(registry: &mut PluginRegistry, outcome: &LoadOutcome) {
        for candidate in &outcome.loaded {
            registry.register(NewRegistration {
                plugin: Arc::new(candidate.instantiate()),
                origin: PluginOrigin::Discovered,
                version: candidate.manifest.version.clone(),
                install_path: Some(candidate.path.clone()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemKind;
    use crate::plugin::protocol::PluginManifest;
    use crate::plugin::registry::tests::StubPlugin;

    fn candidate(id: &str) -> DiscoveredPlugin {
        DiscoveredPlugin {
            manifest: PluginManifest {
                id: id.to_string(),
                name: id.to_string(),
                version: Some("1.2.3".to_string()),
                kinds: vec![ItemKind::GlobalPrompt],
                operations: vec!["discover".to_string(), "emit".to_string()],
                path_patterns: None,
            },
            path: PathBuf::from(format!("/plugins/agentshift-plugin-{}", id)),
        }
    }

    fn registry_with(ids: &[&str]) -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        for id in ids {
            registry.register(NewRegistration::builtin(Arc::new(StubPlugin::new(id))));
        }
        registry
    }

    fn loaded_ids(outcome: &LoadOutcome) -> Vec<&str> {
        outcome.loaded.iter().map(|c| c.id()).collect()
    }

    #[test]
    fn default_strategy_prefers_existing() {
        assert_eq!(PluginLoader::default().strategy(), ConflictStrategy::PreferExisting);
    }

    #[test]
    fn non_conflicting_candidates_are_accepted() {
        let registry = registry_with(&["x"]);
        for strategy in [
            ConflictStrategy::PreferExisting,
            ConflictStrategy::PreferDiscovered,
            ConflictStrategy::Fail,
        ] {
            let outcome = PluginLoader::new(strategy)
                .resolve(&registry, vec![candidate("a"), candidate("b")])
                .unwrap();
            assert_eq!(loaded_ids(&outcome), vec!["a", "b"]);
            assert!(outcome.skipped.is_empty());
        }
    }

    #[test]
    fn prefer_existing_skips_conflict() {
        let registry = registry_with(&["x"]);
        let outcome = PluginLoader::new(ConflictStrategy::PreferExisting)
            .resolve(&registry, vec![candidate("x"), candidate("y")])
            .unwrap();

        assert_eq!(loaded_ids(&outcome), vec!["y"]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].id, "x");
        assert!(outcome.skipped[0].reason.contains("'x'"));
    }

    #[test]
    fn prefer_discovered_accepts_conflict() {
        let registry = registry_with(&["x"]);
        let outcome = PluginLoader::new(ConflictStrategy::PreferDiscovered)
            .resolve(&registry, vec![candidate("x")])
            .unwrap();

        assert_eq!(loaded_ids(&outcome), vec!["x"]);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn fail_strategy_stops_at_first_conflict() {
        let registry = registry_with(&["x", "z"]);
        let err = PluginLoader::new(ConflictStrategy::Fail)
            .resolve(&registry, vec![candidate("a"), candidate("x"), candidate("z")])
            .unwrap_err();

        assert_eq!(
            err,
            LoaderError::Conflict {
                id: "x".to_string(),
                path: PathBuf::from("/plugins/agentshift-plugin-x"),
                existing: PluginOrigin::Builtin,
            }
        );
    }

    #[test]
    fn resolve_does_not_mutate_registry() {
        let registry = registry_with(&["x"]);
        let _ = PluginLoader::new(ConflictStrategy::PreferDiscovered)
            .resolve(&registry, vec![candidate("x"), candidate("new")])
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert!(!registry.has("new"));
        assert_eq!(registry.get("x").unwrap().origin, PluginOrigin::Builtin);
    }

    #[test]
    fn register_all_records_metadata() {
        let mut registry = registry_with(&["x"]);
        let outcome = PluginLoader::new(ConflictStrategy::PreferDiscovered)
            .resolve(&registry, vec![candidate("x"), candidate("y")])
            .unwrap();

        PluginLoader::register_all(&mut registry, &outcome);

        assert_eq!(registry.len(), 2);
        let x = registry.get("x").unwrap();
        assert_eq!(x.origin, PluginOrigin::Discovered);
        assert_eq!(x.version.as_deref(), Some("1.2.3"));
        assert_eq!(
            x.install_path.as_deref(),
            Some(std::path::Path::new("/plugins/agentshift-plugin-x"))
        );
    }
}
