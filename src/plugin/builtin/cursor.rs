//! Cursor format
//!
//! | Item | Location |
//! |------|----------|
//! | Rules | `.cursor/rules/**/*.mdc` (frontmatter: `description`, `globs`, `alwaysApply`) |
//! | Legacy rules | `.cursorrules` |
//! | Ignore list | `.cursorignore` |
//!
//! A rule with `alwaysApply: true` is a global prompt, a rule with globs is
//! a file rule, anything else is a manually invoked prompt.

use super::frontmatter::{self, Document};
use super::plan::{EmitPlan, PlannedFile};
use super::{
    file_stem, metadata_from_frontmatter, metadata_into_frontmatter, slug, unreadable, walk_files,
};
use crate::domain::{
    CustomizationItem, DiscoverResult, EmitOptions, EmitResult, ItemKind, ItemPayload, Warning,
    WarningCode,
};
use crate::plugin::error::PluginError;
use crate::plugin::traits::{ConversionPlugin, PathPatterns};
use crate::workspace::Workspace;

const RULES_DIR: &str = ".cursor/rules";
const LEGACY_RULES: &str = ".cursorrules";
const IGNORE_FILE: &str = ".cursorignore";

/// Frontmatter keys interpreted by this plugin
const KNOWN_KEYS: &[&str] = &["description", "globs", "alwaysApply"];

/// Built-in plugin for Cursor rule files
#[derive(Debug, Default)]
pub struct CursorPlugin;

impl CursorPlugin {
    pub fn new() -> Self {
        Self
    }

    fn read_rule(
        &self,
        workspace: &dyn Workspace,
        path: &str,
    ) -> Result<CustomizationItem, String> {
        let content = workspace.read(path).map_err(|e| e.to_string())?;
        let mut doc = frontmatter::parse(&content).map_err(|e| e.to_string())?;

        let description = doc.take("description").and_then(|v| v.as_str().map(str::to_string));
        let globs = frontmatter::string_list(doc.take("globs").as_ref());
        let always = frontmatter::flag(doc.take("alwaysApply").as_ref());

        let payload = if always {
            ItemPayload::GlobalPrompt
        } else if !globs.is_empty() {
            ItemPayload::FileRule { globs }
        } else {
            ItemPayload::ManualPrompt {
                description: description.clone(),
            }
        };

        let keeps_description = !matches!(payload, ItemPayload::ManualPrompt { .. });
        let mut item = CustomizationItem::new(file_stem(path), payload, doc.body.clone(), path);
        item.metadata = metadata_from_frontmatter(&doc, KNOWN_KEYS);
        if keeps_description {
            if let Some(description) = description {
                item.metadata.set("description", description);
            }
        }

        Ok(item)
    }

    fn rule_document(&self, item: &CustomizationItem, plan: &mut EmitPlan) -> Document {
        let mut doc = Document::new(item.content.clone());

        let description = item
            .payload
            .description()
            .map(str::to_string)
            .or_else(|| {
                item.metadata
                    .get("description")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            });
        if let Some(description) = description {
            doc.set("description", description);
        }

        match &item.payload {
            ItemPayload::GlobalPrompt => {
                doc.set("alwaysApply", true);
            }
            ItemPayload::FileRule { globs } => {
                doc.set("globs", globs.join(", "));
                doc.set("alwaysApply", false);
            }
            ItemPayload::ManualPrompt { .. } => {
                doc.set("alwaysApply", false);
            }
            ItemPayload::SimpleSkill { .. } => {
                doc.set("alwaysApply", false);
                plan.warn(
                    Warning::new(
                        WarningCode::Approximated,
                        format!("Skill '{}' written as a manually applied rule", item.name),
                    )
                    .with_sources(item.source_path.clone()),
                );
            }
            ItemPayload::FullSkill { .. } | ItemPayload::IgnoreList { .. } => {}
        }

        metadata_into_frontmatter(&mut doc, &item.metadata, &["description"]);
        doc
    }
}

impl ConversionPlugin for CursorPlugin {
    fn id(&self) -> &str {
        "cursor"
    }

    fn name(&self) -> &str {
        "Cursor"
    }

    fn version(&self) -> Option<&str> {
        Some(env!("CARGO_PKG_VERSION"))
    }

    fn supported_kinds(&self) -> &[ItemKind] {
        &[
            ItemKind::GlobalPrompt,
            ItemKind::SimpleSkill,
            ItemKind::FileRule,
            ItemKind::IgnoreList,
            ItemKind::ManualPrompt,
        ]
    }

    fn discover(&self, workspace: &dyn Workspace) -> Result<DiscoverResult, PluginError> {
        let mut result = DiscoverResult::default();

        if workspace.exists(LEGACY_RULES) {
            match workspace.read(LEGACY_RULES) {
                Ok(content) => result.items.push(CustomizationItem::new(
                    "cursorrules",
                    ItemPayload::GlobalPrompt,
                    content.trim(),
                    LEGACY_RULES,
                )),
                Err(e) => result.warnings.push(unreadable(LEGACY_RULES, &e.to_string())),
            }
        }

        for path in walk_files(workspace, RULES_DIR)? {
            if !path.ends_with(".mdc") {
                continue;
            }
            match self.read_rule(workspace, &path) {
                Ok(item) => result.items.push(item),
                Err(message) => result.warnings.push(unreadable(&path, &message)),
            }
        }

        if workspace.exists(IGNORE_FILE) {
            match workspace.read(IGNORE_FILE) {
                Ok(content) => {
                    let patterns = content
                        .lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty() && !l.starts_with('#'))
                        .map(str::to_string)
                        .collect();
                    result.items.push(CustomizationItem::new(
                        "cursorignore",
                        ItemPayload::IgnoreList { patterns },
                        content,
                        IGNORE_FILE,
                    ));
                }
                Err(e) => result.warnings.push(unreadable(IGNORE_FILE, &e.to_string())),
            }
        }

        log::debug!("cursor: discovered {} item(s)", result.items.len());
        Ok(result)
    }

    fn emit(
        &self,
        items: &[CustomizationItem],
        workspace: &dyn Workspace,
        options: &EmitOptions,
    ) -> Result<EmitResult, PluginError> {
        let mut plan = EmitPlan::new(self.id());
        let mut ignore_items = Vec::new();

        for item in items {
            match &item.payload {
                ItemPayload::GlobalPrompt
                | ItemPayload::FileRule { .. }
                | ItemPayload::ManualPrompt { .. }
                | ItemPayload::SimpleSkill { .. } => {
                    let doc = self.rule_document(item, &mut plan);
                    plan.add(PlannedFile::new(
                        format!("{}/{}.mdc", RULES_DIR, slug(&item.name)),
                        frontmatter::render(&doc),
                        item.kind(),
                        vec![item.clone()],
                    ));
                }
                ItemPayload::IgnoreList { .. } => ignore_items.push(item.clone()),
                ItemPayload::FullSkill { .. } => plan.unsupported(item),
            }
        }

        if !ignore_items.is_empty() {
            let mut patterns: Vec<&str> = Vec::new();
            for item in &ignore_items {
                if let ItemPayload::IgnoreList { patterns: item_patterns } = &item.payload {
                    for pattern in item_patterns {
                        if !patterns.contains(&pattern.as_str()) {
                            patterns.push(pattern);
                        }
                    }
                }
            }

            if ignore_items.len() > 1 {
                plan.warn(
                    Warning::new(
                        WarningCode::Merged,
                        format!("Merged {} ignore lists into {}", ignore_items.len(), IGNORE_FILE),
                    )
                    .with_sources(ignore_items.iter().filter_map(|i| i.source_path.clone())),
                );
            }

            let mut content = patterns.join("\n");
            content.push('\n');
            plan.add(PlannedFile::new(IGNORE_FILE, content, ItemKind::IgnoreList, ignore_items));
        }

        plan.commit(workspace, options)
    }

    fn path_patterns(&self) -> Option<PathPatterns> {
        Some(PathPatterns::new([".cursor/rules/"], ["mdc"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::FsWorkspace;
    use tempfile::TempDir;

    fn workspace_with(files: &[(&str, &str)]) -> (TempDir, FsWorkspace) {
        let dir = TempDir::new().unwrap();
        let ws = FsWorkspace::new(dir.path());
        for (path, content) in files {
            ws.write(path, content).unwrap();
        }
        (dir, ws)
    }

    #[test]
    fn discover_empty_workspace() {
        let (_dir, ws) = workspace_with(&[]);
        let result = CursorPlugin::new().discover(&ws).unwrap();
        assert!(result.items.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn discover_classifies_rules() {
        let (_dir, ws) = workspace_with(&[
            (
                ".cursor/rules/always.mdc",
                "---\nalwaysApply: true\ndescription: Basics\n---\nBe nice.",
            ),
            (".cursor/rules/ts.mdc", "---\nglobs: *.ts, *.tsx\n---\nUse strict mode."),
            (
                ".cursor/rules/manual.mdc",
                "---\ndescription: Release steps\nowner: infra\n---\nTag it.",
            ),
        ]);

        let result = CursorPlugin::new().discover(&ws).unwrap();
        assert_eq!(result.items.len(), 3);

        let always = &result.items[0];
        assert_eq!(always.kind(), ItemKind::GlobalPrompt);
        assert_eq!(always.content, "Be nice.");
        assert_eq!(always.metadata.get("description"), Some(&serde_json::json!("Basics")));

        let manual = &result.items[1];
        assert_eq!(
            manual.payload,
            ItemPayload::ManualPrompt {
                description: Some("Release steps".to_string())
            }
        );
        assert_eq!(manual.metadata.get("owner"), Some(&serde_json::json!("infra")));

        let ts = &result.items[2];
        assert_eq!(
            ts.payload,
            ItemPayload::FileRule {
                globs: vec!["*.ts".to_string(), "*.tsx".to_string()]
            }
        );
        assert_eq!(ts.source_path.as_deref(), Some(".cursor/rules/ts.mdc"));
    }

    #[test]
    fn discover_legacy_and_ignore_files() {
        let (_dir, ws) = workspace_with(&[
            (".cursorrules", "Legacy rules\n"),
            (".cursorignore", "# secrets\n.env\n\nbuild/\n"),
        ]);

        let result = CursorPlugin::new().discover(&ws).unwrap();
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].kind(), ItemKind::GlobalPrompt);
        assert_eq!(
            result.items[1].payload,
            ItemPayload::IgnoreList {
                patterns: vec![".env".to_string(), "build/".to_string()]
            }
        );
    }

    #[test]
    fn unreadable_rule_warns_and_continues() {
        let (_dir, ws) = workspace_with(&[
            (".cursor/rules/bad.mdc", "---\ndescription: never closed\n"),
            (".cursor/rules/good.mdc", "Plain body"),
        ]);

        let result = CursorPlugin::new().discover(&ws).unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].name, "good");
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, WarningCode::Unreadable);
        assert_eq!(result.warnings[0].sources, vec![".cursor/rules/bad.mdc"]);
    }

    #[test]
    fn emit_rules_and_merged_ignores() {
        let (_dir, ws) = workspace_with(&[]);
        let items = vec![
            CustomizationItem::new(
                "Style Guide",
                ItemPayload::FileRule {
                    globs: vec!["*.rs".to_string()],
                },
                "Run rustfmt.",
                "a.md",
            ),
            CustomizationItem::new(
                "one",
                ItemPayload::IgnoreList {
                    patterns: vec!["a".into()],
                },
                "a",
                "i1",
            ),
            CustomizationItem::new(
                "two",
                ItemPayload::IgnoreList {
                    patterns: vec!["a".into(), "b".into()],
                },
                "a\nb",
                "i2",
            ),
        ];

        let result = CursorPlugin::new().emit(&items, &ws, &EmitOptions::default()).unwrap();

        assert_eq!(result.written.len(), 2);
        let rule = ws.read(".cursor/rules/style-guide.mdc").unwrap();
        let parsed = frontmatter::parse(&rule).unwrap();
        assert_eq!(parsed.get_str("globs"), Some("*.rs"));
        assert!(rule.contains("alwaysApply: false"));
        assert!(rule.ends_with("Run rustfmt.\n"));

        assert_eq!(ws.read(".cursorignore").unwrap(), "a\nb\n");
        assert_eq!(result.written[1].item_count, 2);
        assert!(result.warnings.iter().any(|w| w.code == WarningCode::Merged));
    }

    #[test]
    fn emit_full_skill_is_unsupported() {
        let (_dir, ws) = workspace_with(&[]);
        let skill = CustomizationItem::new(
            "deploy",
            ItemPayload::FullSkill {
                description: "Deploys".to_string(),
                files: vec![],
            },
            "steps",
            ".claude/skills/deploy/SKILL.md",
        );

        let result = CursorPlugin::new().emit(&[skill], &ws, &EmitOptions::default()).unwrap();
        assert!(result.written.is_empty());
        assert_eq!(result.unsupported.len(), 1);
    }

    #[test]
    fn rules_roundtrip_through_discover() {
        let (_dir, ws) = workspace_with(&[(
            ".cursor/rules/api.mdc",
            "---\ndescription: API rules\nglobs: src/api/**\n---\nValidate input.",
        )]);
        let plugin = CursorPlugin::new();
        let first = plugin.discover(&ws).unwrap();

        let (_out_dir, out) = workspace_with(&[]);
        plugin.emit(&first.items, &out, &EmitOptions::default()).unwrap();
        let second = plugin.discover(&out).unwrap();

        assert_eq!(second.items[0].payload, first.items[0].payload);
        assert_eq!(second.items[0].content, first.items[0].content);
        assert_eq!(second.items[0].metadata, first.items[0].metadata);
    }
}
