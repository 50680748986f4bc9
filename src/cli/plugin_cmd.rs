//! Plugin management commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::plugin::{
    ConflictStrategy, ConversionPlugin, DiscoveryError, PluginLoader, PluginRegistration,
    PluginRegistry, SkippedPlugin,
};
use crate::storage::Config;

#[derive(Subcommand)]
pub enum PluginCommands {
    /// List available plugins
    List,

    /// Show details for one plugin
    Show {
        /// Plugin id
        id: String,
    },
}

/// Registry with built-ins and discovered plugins, plus what went wrong
pub(super) struct LoadedPlugins {
    pub registry: PluginRegistry,
    pub errors: Vec<DiscoveryError>,
    pub skipped: Vec<SkippedPlugin>,
}

impl LoadedPlugins {
    /// Looks up a plugin, failing with the list of known ids
    pub fn require(&self, id: &str) -> Result<std::sync::Arc<dyn ConversionPlugin>> {
        self.registry.get_instance(id).ok_or_else(|| {
            let known: Vec<&str> = self.registry.list().iter().map(|r| r.id()).collect();
            anyhow::anyhow!("Unknown plugin '{}'. Available: {}", id, known.join(", "))
        })
    }
}

/// Builds the registry for this run: built-ins first, then discoveries
pub(super) fn load_plugins(config: &Config, strategy: ConflictStrategy) -> Result<LoadedPlugins> {
    let mut registry = PluginRegistry::with_builtins();

    let discovery = config.plugin_discovery();
    let report = discovery.discover();
    for error in &report.errors {
        log::warn!("Invalid plugin {}: {}", error.path.display(), error.message);
    }

    let outcome = PluginLoader::new(strategy).resolve(&registry, report.plugins)?;
    PluginLoader::register_all(&mut registry, &outcome);

    Ok(LoadedPlugins {
        registry,
        errors: report.errors,
        skipped: outcome.skipped,
    })
}

pub fn run(cmd: PluginCommands, config: &Config, output: &Output) -> Result<()> {
    let plugins = load_plugins(config, config.project.conflict_strategy)?;

    match cmd {
        PluginCommands::List => list_plugins(output, &plugins),
        PluginCommands::Show { id } => show_plugin(output, &plugins, &id),
    }
}

fn registration_json(registration: &PluginRegistration) -> serde_json::Value {
    let plugin = &registration.plugin;
    serde_json::json!({
        "id": registration.id(),
        "name": plugin.name(),
        "origin": registration.origin,
        "version": registration.version,
        "install_path": registration.install_path,
        "registered_at": registration.registered_at,
        "kinds": plugin.supported_kinds(),
        "path_patterns": plugin.path_patterns(),
    })
}

fn list_plugins(output: &Output, plugins: &LoadedPlugins) -> Result<()> {
    let registrations = plugins.registry.list();

    if output.is_json() {
        output.data(&serde_json::json!({
            "plugins": registrations.iter().map(registration_json).collect::<Vec<_>>(),
            "errors": plugins.errors,
            "skipped": plugins.skipped,
        }));
        return Ok(());
    }

    println!("{:<16} {:<24} {:<12} {}", "ID", "NAME", "ORIGIN", "VERSION");
    println!("{}", "-".repeat(70));
    for registration in registrations {
        println!(
            "{:<16} {:<24} {:<12} {}",
            registration.id(),
            registration.plugin.name(),
            registration.origin,
            registration.version.as_deref().unwrap_or("-")
        );
    }

    if !plugins.skipped.is_empty() {
        println!();
        println!("Skipped:");
        for skipped in &plugins.skipped {
            println!("  {} ({}): {}", skipped.id, skipped.path.display(), skipped.reason);
        }
    }

    if !plugins.errors.is_empty() {
        println!();
        println!("Invalid plugin packages:");
        for error in &plugins.errors {
            println!("  {}: {}", error.path.display(), error.message);
        }
    }

    Ok(())
}

fn show_plugin(output: &Output, plugins: &LoadedPlugins, id: &str) -> Result<()> {
    let registration = plugins
        .registry
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Plugin not found: {}", id))?;

    if output.is_json() {
        output.data(&registration_json(registration));
        return Ok(());
    }

    let plugin = &registration.plugin;
    let kinds: Vec<String> = plugin.supported_kinds().iter().map(|k| k.to_string()).collect();

    println!("Plugin: {} ({})", plugin.name(), registration.id());
    println!("Origin: {}", registration.origin);
    println!("Version: {}", registration.version.as_deref().unwrap_or("-"));
    if let Some(path) = &registration.install_path {
        println!("Path: {}", path.display());
    }
    println!("Registered: {}", registration.registered_at.to_rfc3339());
    println!("Kinds: {}", kinds.join(", "));
    if let Some(patterns) = plugin.path_patterns() {
        println!(
            "Path patterns: {} ({})",
            patterns.prefixes.join(", "),
            patterns.extensions.join(", ")
        );
    }

    Ok(())
}
