//! Emission planning shared by the built-in plugins
//!
//! A plugin first describes every file it wants to produce in an
//! [`EmitPlan`]. [`EmitPlan::commit`] then resolves path collisions and
//! classifies each file as created or overwritten. Only after the whole
//! result is computed does it branch on `dry_run`, so a trial emission and
//! a real one always agree on what would be written.

use std::collections::HashSet;

use super::super::error::PluginError;
use crate::domain::{
    CustomizationItem, EmitOptions, EmitResult, ItemKind, SkillFile, Warning, WarningCode,
    WrittenFile,
};
use crate::workspace::{join, Workspace};

/// How to derive an alternative path when the planned one is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameStyle {
    /// `rules/a.mdc` becomes `rules/a-2.mdc`
    FileStem,

    /// `skills/a/SKILL.md` becomes `skills/a-2/SKILL.md`
    ParentDir,
}

/// A file the plugin intends to write
#[derive(Debug, Clone)]
pub struct PlannedFile {
    /// Path relative to the workspace root
    pub path: String,
    pub content: String,
    pub kind: ItemKind,
    pub sources: Vec<CustomizationItem>,

    /// Extra files written next to `path`, relative to its directory
    pub attachments: Vec<SkillFile>,
    pub rename: RenameStyle,
}

impl PlannedFile {
    pub fn new(
        path: impl Into<String>,
        content: impl Into<String>,
        kind: ItemKind,
        sources: Vec<CustomizationItem>,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            kind,
            sources,
            attachments: Vec::new(),
            rename: RenameStyle::FileStem,
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<SkillFile>) -> Self {
        self.attachments = attachments;
        self.rename = RenameStyle::ParentDir;
        self
    }

    fn source_paths(&self) -> Vec<String> {
        self.sources.iter().filter_map(|s| s.source_path.clone()).collect()
    }

    /// The path that decides whether this file collides
    fn claim_path(&self) -> String {
        claim_of(&self.path, self.rename)
    }
}

/// Files, warnings and unsupported items collected during an emission
#[derive(Debug, Default)]
pub struct EmitPlan {
    plugin: String,
    files: Vec<PlannedFile>,
    warnings: Vec<Warning>,
    unsupported: Vec<CustomizationItem>,
}

impl EmitPlan {
    pub fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            ..Self::default()
        }
    }

    pub fn add(&mut self, file: PlannedFile) {
        self.files.push(file);
    }

    pub fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    /// Records an item the target format cannot represent
    pub fn unsupported(&mut self, item: &CustomizationItem) {
        self.warnings.push(
            Warning::new(
                WarningCode::Skipped,
                format!("{} '{}' is not supported by {}", item.kind(), item.name, self.plugin),
            )
            .with_sources(item.source_path.clone()),
        );
        self.unsupported.push(item.clone());
    }

    /// Resolves collisions and, unless this is a dry run, writes the files
    pub fn commit(
        self,
        workspace: &dyn Workspace,
        options: &EmitOptions,
    ) -> Result<EmitResult, PluginError> {
        let EmitPlan {
            plugin,
            files,
            mut warnings,
            unsupported,
        } = self;

        let mut claimed: HashSet<String> = HashSet::new();
        let mut resolved = Vec::with_capacity(files.len());

        for mut file in files {
            let mut created = true;
            let original = file.path.clone();
            let claim = file.claim_path();

            if claimed.contains(&claim) || (workspace.exists(&claim) && !options.force) {
                let mut n = 2;
                loop {
                    let candidate = suffixed(&original, n, file.rename);
                    let candidate_claim = claim_of(&candidate, file.rename);
                    if !claimed.contains(&candidate_claim) && !workspace.exists(&candidate_claim) {
                        file.path = candidate;
                        break;
                    }
                    n += 1;
                }
                warnings.push(
                    Warning::new(
                        WarningCode::Renamed,
                        format!("{} already exists, writing {} instead", original, file.path),
                    )
                    .with_sources(file.source_paths())
                    .with_details(serde_json::json!({ "from": original, "to": file.path })),
                );
            } else if workspace.exists(&claim) {
                created = false;
                warnings.push(
                    Warning::new(
                        WarningCode::Overwritten,
                        format!("Overwriting existing {}", file.path),
                    )
                        .with_sources(file.source_paths()),
                );
            }

            claimed.insert(file.claim_path());
            resolved.push((file, created));
        }

        if options.dry_run {
            log::debug!("{}: dry run, {} file(s) planned", plugin, resolved.len());
        } else {
            for (file, _) in &resolved {
                workspace.write(&file.path, &file.content)?;
                let dir = parent(&file.path);
                for attachment in &file.attachments {
                    workspace.write(&join(dir, &attachment.path), &attachment.content)?;
                }
            }
            log::debug!("{}: wrote {} file(s)", plugin, resolved.len());
        }

        let written = resolved
            .into_iter()
            .map(|(file, created)| WrittenFile {
                path: workspace.root().join(&file.path),
                kind: file.kind,
                item_count: file.sources.len(),
                created,
                sources: file.sources,
            })
            .collect();

        Ok(EmitResult {
            written,
            warnings,
            unsupported,
        })
    }
}

/// Directory part of a relative path (empty for top-level files)
fn parent(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn claim_of(path: &str, style: RenameStyle) -> String {
    match style {
        RenameStyle::FileStem => path.to_string(),
        RenameStyle::ParentDir if !parent(path).is_empty() => parent(path).to_string(),
        RenameStyle::ParentDir => path.to_string(),
    }
}

/// Builds the `n`th alternative for a path
fn suffixed(path: &str, n: usize, style: RenameStyle) -> String {
    match style {
        RenameStyle::FileStem => {
            let (dir, file) = match path.rsplit_once('/') {
                Some((dir, file)) => (Some(dir), file),
                None => (None, path),
            };
            let renamed = match file.rfind('.') {
                Some(dot) if dot > 0 => format!("{}-{}{}", &file[..dot], n, &file[dot..]),
                _ => format!("{}-{}", file, n),
            };
            match dir {
                Some(dir) => format!("{}/{}", dir, renamed),
                None => renamed,
            }
        }
        RenameStyle::ParentDir => {
            let dir = parent(path);
            let file = path.rsplit_once('/').map(|(_, f)| f).unwrap_or(path);
            if dir.is_empty() {
                return suffixed(path, n, RenameStyle::FileStem);
            }
            format!("{}-{}/{}", dir, n, file)
        }
    }
}
