//! Path reference rewriting
//!
//! Items often mention each other by path (`see .cursor/rules/api.mdc`).
//! When a conversion moves files, those references must follow. The
//! mapping from old to new paths is derived from an emission's
//! [`WrittenFile`] records rather than computed from path rules, so merged
//! files, renamed extensions and flattened directories are all covered
//! without format-specific knowledge.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use regex::Regex;

use super::{TransformContext, TransformOutput, Transformation};
use crate::domain::{normalize_path, CustomizationItem, Warning, WarningCode, WrittenFile};
use crate::plugin::PluginError;

/// Source-relative path to target-relative path, both `/`-separated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMapping(BTreeMap<String, String>);

impl PathMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry; a later insert for the same source wins
    pub fn insert(&mut self, source: impl AsRef<str>, target: impl AsRef<str>) {
        self.0
            .insert(normalize_path(source.as_ref()), normalize_path(target.as_ref()));
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.0.get(source).map(String::as_str)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.0.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries ordered for replacement: longest key first, then by key
    fn replacement_order(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self.iter().collect();
        entries.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        entries
    }
}

/// Builds the source to target mapping from emission records
///
/// Absolute output paths are made relative to `target_root`. Items without
/// a source path contribute nothing.
pub fn build_mapping(written: &[WrittenFile], target_root: &Path) -> PathMapping {
    let mut mapping = PathMapping::new();

    for file in written {
        let relative = file.path.strip_prefix(target_root).unwrap_or(&file.path);
        let target = relative.to_string_lossy();

        for source in &file.sources {
            if let Some(source_path) = &source.source_path {
                mapping.insert(source_path, target.as_ref());
            }
        }
    }

    mapping
}

/// Items after rewriting plus the number of replacements made
#[derive(Debug, Clone, Default)]
pub struct RewriteOutcome {
    pub items: Vec<CustomizationItem>,
    pub replacements: usize,
}

/// Replaces every mapped source path in item content with its target path
///
/// Matching is literal. Longer keys are applied before shorter ones so a
/// key that prefixes another (`a.mdc` and `a.mdc.bak`) cannot corrupt the
/// longer reference.
pub fn rewrite_content(items: &[CustomizationItem], mapping: &PathMapping) -> RewriteOutcome {
    let order = mapping.replacement_order();
    let mut replacements = 0;

    let items = items
        .iter()
        .map(|item| {
            let mut content = item.content.clone();
            for &(from, to) in &order {
                let count = content.matches(from).count();
                if count > 0 {
                    content = content.replace(from, to);
                    replacements += count;
                }
            }
            item.with_content(content)
        })
        .collect();

    RewriteOutcome { items, replacements }
}

/// Builds the regex matching path-shaped references for the given hints
fn orphan_pattern(prefixes: &[String], extensions: &[String]) -> Option<Regex> {
    if prefixes.is_empty() || extensions.is_empty() {
        return None;
    }

    let prefixes: Vec<String> = prefixes.iter().map(|p| regex::escape(p)).collect();
    let extensions: Vec<String> = extensions
        .iter()
        .map(|e| regex::escape(e.trim_start_matches('.')))
        .collect();

    let pattern = format!(
        r#"(?:{})[^\s\[\](){{}}<>"'`]*\.(?:{})\b"#,
        prefixes.join("|"),
        extensions.join("|")
    );

    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("Skipping orphan detection, bad path pattern: {}", e);
            None
        }
    }
}

/// Flags path-shaped references that have no entry in the mapping
///
/// A best-effort heuristic: it reports at most one warning per distinct
/// reference in each item, in order of first occurrence.
pub fn detect_orphans(
    items: &[CustomizationItem],
    mapping: &PathMapping,
    prefixes: &[String],
    extensions: &[String],
) -> Vec<Warning> {
    let Some(re) = orphan_pattern(prefixes, extensions) else {
        return Vec::new();
    };

    let mut warnings = Vec::new();

    for item in items {
        let mut seen: HashSet<&str> = HashSet::new();

        for found in re.find_iter(&item.content) {
            let reference = found.as_str();
            if mapping.contains(reference) || !seen.insert(reference) {
                continue;
            }

            warnings.push(
                Warning::new(
                    WarningCode::OrphanReference,
                    format!("'{}' references {} which was not converted", item.name, reference),
                )
                .with_sources(item.source_path.clone())
                .with_details(serde_json::json!({ "item": item.id, "reference": reference })),
            );
        }
    }

    warnings
}

/// Rewrites path references to match where the target plugin puts files
#[derive(Debug, Clone, Copy)]
pub struct PathRewriteTransformation {
    pub detect_orphans: bool,
}

impl PathRewriteTransformation {
    pub fn new(detect_orphans: bool) -> Self {
        Self { detect_orphans }
    }
}

impl Default for PathRewriteTransformation {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Transformation for PathRewriteTransformation {
    fn name(&self) -> &str {
        "path-rewrite"
    }

    fn apply(&self, ctx: &TransformContext<'_>) -> Result<TransformOutput, PluginError> {
        let trial = ctx.trial_emit(ctx.items)?;
        let mapping = build_mapping(&trial.written, ctx.target_workspace.root());

        if mapping.is_empty() {
            log::debug!("path-rewrite: trial emission produced no mapping");
            return Ok(TransformOutput {
                items: ctx.items.to_vec(),
                warnings: Vec::new(),
            });
        }

        let outcome = rewrite_content(ctx.items, &mapping);
        log::debug!(
            "path-rewrite: {} mapping(s), {} replacement(s)",
            mapping.len(),
            outcome.replacements
        );

        let warnings = match (self.detect_orphans, ctx.source.path_patterns()) {
            (true, Some(patterns)) => detect_orphans(
                &outcome.items,
                &mapping,
                &patterns.prefixes,
                &patterns.extensions,
            ),
            _ => Vec::new(),
        };

        Ok(TransformOutput {
            items: outcome.items,
            warnings,
        })
    }
}
