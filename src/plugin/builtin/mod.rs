//! Built-in conversion plugins
//!
//! - `cursor` - Cursor rules (`.cursor/rules/*.mdc`, `.cursorrules`, `.cursorignore`)
//! - `claude` - Claude Code memory, commands and skills (`CLAUDE.md`, `.claude/`)

mod claude;
mod cursor;
pub mod frontmatter;
pub mod plan;

use std::sync::Arc;

pub use claude::ClaudePlugin;
pub use cursor::CursorPlugin;

use self::frontmatter::Document;
use super::error::PluginError;
use super::traits::ConversionPlugin;
use crate::domain::{ItemMeta, Warning, WarningCode};
use crate::workspace::{join, Workspace};

/// Returns one instance of every built-in plugin, in registration order
pub fn builtins() -> Vec<Arc<dyn ConversionPlugin>> {
    vec![Arc::new(CursorPlugin::new()), Arc::new(ClaudePlugin::new())]
}

/// Turns an item name into a file-name friendly slug
pub(crate) fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c.to_ascii_lowercase());
            dash = false;
        } else if !dash && !out.is_empty() {
            out.push('-');
            dash = true;
        }
    }

    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "item".to_string()
    } else {
        trimmed.to_string()
    }
}

/// File name without directory and extension
pub(crate) fn file_stem(path: &str) -> &str {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    }
}

pub(crate) fn unreadable(path: &str, message: &str) -> Warning {
    Warning::new(WarningCode::Unreadable, format!("Could not read {}: {}", path, message))
        .with_sources([path])
}

/// Lists every file below `dir`, depth first, in sorted order
///
/// A missing directory yields no files.
pub(crate) fn walk_files(workspace: &dyn Workspace, dir: &str) -> Result<Vec<String>, PluginError> {
    let mut files = Vec::new();
    if !workspace.exists(dir) {
        return Ok(files);
    }

    for entry in workspace.readdir(dir)? {
        let path = join(dir, &entry.name);
        if entry.is_dir {
            files.extend(walk_files(workspace, &path)?);
        } else {
            files.push(path);
        }
    }

    Ok(files)
}

/// Copies frontmatter keys not in `skip` into item metadata
pub(crate) fn metadata_from_frontmatter(doc: &Document, skip: &[&str]) -> ItemMeta {
    let mut meta = ItemMeta::new();
    for (key, value) in &doc.frontmatter {
        let Some(key) = key.as_str() else { continue };
        if skip.contains(&key) {
            continue;
        }
        if let Some(json) = frontmatter::to_json(value) {
            meta.set(key, json);
        }
    }
    meta
}

/// Writes metadata back as frontmatter without overriding keys already set
pub(crate) fn metadata_into_frontmatter(doc: &mut Document, meta: &ItemMeta, skip: &[&str]) {
    for (key, value) in meta.iter() {
        if skip.contains(&key.as_str()) || doc.get(key).is_some() {
            continue;
        }
        if let Some(yaml) = frontmatter::from_json(value) {
            doc.set(key, yaml);
        }
    }
}
