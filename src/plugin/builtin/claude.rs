//! Claude Code format
//!
//! | Item | Location |
//! |------|----------|
//! | Memory | `CLAUDE.md` |
//! | Slash commands | `.claude/commands/*.md` |
//! | Skills | `.claude/skills/<name>/SKILL.md` plus supporting files |
//!
//! Claude has no file-scoped rules, so file rules are folded into
//! `CLAUDE.md` as sections that name the globs they apply to.

use super::frontmatter::{self, Document};
use super::plan::{EmitPlan, PlannedFile};
use super::{
    file_stem, metadata_from_frontmatter, metadata_into_frontmatter, slug, unreadable, walk_files,
};
use crate::domain::{
    CustomizationItem, DiscoverResult, EmitOptions, EmitResult, ItemKind, ItemPayload, SkillFile,
    Warning, WarningCode,
};
use crate::plugin::error::PluginError;
use crate::plugin::traits::{ConversionPlugin, PathPatterns};
use crate::workspace::Workspace;

const MEMORY_FILE: &str = "CLAUDE.md";
const COMMANDS_DIR: &str = ".claude/commands";
const SKILLS_DIR: &str = ".claude/skills";
const SKILL_FILE: &str = "SKILL.md";

/// Built-in plugin for Claude Code
#[derive(Debug, Default)]
pub struct ClaudePlugin;

impl ClaudePlugin {
    pub fn new() -> Self {
        Self
    }

    fn read_command(
        &self,
        workspace: &dyn Workspace,
        path: &str,
    ) -> Result<CustomizationItem, String> {
        let content = workspace.read(path).map_err(|e| e.to_string())?;
        let mut doc = frontmatter::parse(&content).map_err(|e| e.to_string())?;

        let description = doc.take("description").and_then(|v| v.as_str().map(str::to_string));
        let mut item = CustomizationItem::new(
            file_stem(path),
            ItemPayload::ManualPrompt { description },
            doc.body.clone(),
            path,
        );
        item.metadata = metadata_from_frontmatter(&doc, &[]);
        Ok(item)
    }

    fn read_skill(
        &self,
        workspace: &dyn Workspace,
        dir: &str,
        dir_name: &str,
    ) -> Result<CustomizationItem, String> {
        let skill_path = format!("{}/{}", dir, SKILL_FILE);
        let content = workspace.read(&skill_path).map_err(|e| e.to_string())?;
        let mut doc = frontmatter::parse(&content).map_err(|e| e.to_string())?;

        let name = doc
            .take("name")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| dir_name.to_string());
        let description = doc
            .take("description")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let mut files = Vec::new();
        for path in walk_files(workspace, dir).map_err(|e| e.to_string())? {
            if path == skill_path {
                continue;
            }
            let content = workspace.read(&path).map_err(|e| e.to_string())?;
            let relative = path[dir.len() + 1..].to_string();
            files.push(SkillFile { path: relative, content });
        }

        let payload = if files.is_empty() {
            ItemPayload::SimpleSkill { description }
        } else {
            ItemPayload::FullSkill { description, files }
        };

        let mut item = CustomizationItem::new(name, payload, doc.body.clone(), skill_path);
        item.metadata = metadata_from_frontmatter(&doc, &[]);
        Ok(item)
    }

    /// Builds the merged `CLAUDE.md` from global prompts and file rules
    fn memory_content(&self, items: &[CustomizationItem], plan: &mut EmitPlan) -> String {
        let mut sections = Vec::with_capacity(items.len());

        for item in items {
            match &item.payload {
                ItemPayload::FileRule { globs } => {
                    let applies: Vec<String> = globs.iter().map(|g| format!("`{}`", g)).collect();
                    sections.push(format!(
                        "## {}\n\nApplies to: {}\n\n{}",
                        item.name,
                        applies.join(", "),
                        item.content
                    ));
                    plan.warn(
                        Warning::new(
                            WarningCode::Approximated,
                            format!(
                                "Rule '{}' is scoped to files but {} is always loaded",
                                item.name, MEMORY_FILE
                            ),
                        )
                        .with_sources(item.source_path.clone())
                        .with_details(serde_json::json!({ "globs": globs })),
                    );
                }
                _ if items.len() > 1 => {
                    sections.push(format!("## {}\n\n{}", item.name, item.content))
                }
                _ => sections.push(item.content.clone()),
            }

            if !item.metadata.is_empty() {
                let keys: Vec<&String> = item.metadata.iter().map(|(k, _)| k).collect();
                plan.warn(
                    Warning::new(
                        WarningCode::Approximated,
                        format!(
                            "Metadata of '{}' has no place in {} and was dropped",
                            item.name, MEMORY_FILE
                        ),
                    )
                    .with_sources(item.source_path.clone())
                    .with_details(serde_json::json!({ "dropped_keys": keys })),
                );
            }
        }

        let mut content = sections.join("\n\n");
        content.push('\n');
        content
    }

    fn command_document(&self, item: &CustomizationItem) -> Document {
        let mut doc = Document::new(item.content.clone());
        if let Some(description) = item.payload.description() {
            doc.set("description", description);
        }
        metadata_into_frontmatter(&mut doc, &item.metadata, &["alwaysApply", "globs"]);
        doc
    }

    fn skill_document(&self, item: &CustomizationItem) -> Document {
        let mut doc = Document::new(item.content.clone());
        doc.set("name", slug(&item.name));
        doc.set("description", item.payload.description().unwrap_or_default());
        metadata_into_frontmatter(&mut doc, &item.metadata, &["alwaysApply", "globs"]);
        doc
    }
}

impl ConversionPlugin for ClaudePlugin {
    fn id(&self) -> &str {
        "claude"
    }

    fn name(&self) -> &str {
        "Claude Code"
    }

    fn version(&self) -> Option<&str> {
        Some(env!("CARGO_PKG_VERSION"))
    }

    fn supported_kinds(&self) -> &[ItemKind] {
        &[
            ItemKind::GlobalPrompt,
            ItemKind::SimpleSkill,
            ItemKind::FullSkill,
            ItemKind::FileRule,
            ItemKind::ManualPrompt,
        ]
    }

    fn discover(&self, workspace: &dyn Workspace) -> Result<DiscoverResult, PluginError> {
        let mut result = DiscoverResult::default();

        if workspace.exists(MEMORY_FILE) {
            match workspace.read(MEMORY_FILE) {
                Ok(content) => result.items.push(CustomizationItem::new(
                    "claude",
                    ItemPayload::GlobalPrompt,
                    content.trim(),
                    MEMORY_FILE,
                )),
                Err(e) => result.warnings.push(unreadable(MEMORY_FILE, &e.to_string())),
            }
        }

        if workspace.exists(COMMANDS_DIR) {
            for entry in workspace.readdir(COMMANDS_DIR)? {
                if entry.is_dir || !entry.name.ends_with(".md") {
                    continue;
                }
                let path = format!("{}/{}", COMMANDS_DIR, entry.name);
                match self.read_command(workspace, &path) {
                    Ok(item) => result.items.push(item),
                    Err(message) => result.warnings.push(unreadable(&path, &message)),
                }
            }
        }

        if workspace.exists(SKILLS_DIR) {
            for entry in workspace.readdir(SKILLS_DIR)? {
                let dir = format!("{}/{}", SKILLS_DIR, entry.name);
                if !entry.is_dir || !workspace.exists(&format!("{}/{}", dir, SKILL_FILE)) {
                    continue;
                }
                match self.read_skill(workspace, &dir, &entry.name) {
                    Ok(item) => result.items.push(item),
                    Err(message) => result.warnings.push(unreadable(&dir, &message)),
                }
            }
        }

        log::debug!("claude: discovered {} item(s)", result.items.len());
        Ok(result)
    }

    fn emit(
        &self,
        items: &[CustomizationItem],
        workspace: &dyn Workspace,
        options: &EmitOptions,
    ) -> Result<EmitResult, PluginError> {
        let mut plan = EmitPlan::new(self.id());
        let mut memory = Vec::new();

        for item in items {
            match &item.payload {
                ItemPayload::GlobalPrompt | ItemPayload::FileRule { .. } => {
                    memory.push(item.clone())
                }
                ItemPayload::ManualPrompt { .. } => {
                    let doc = self.command_document(item);
                    plan.add(PlannedFile::new(
                        format!("{}/{}.md", COMMANDS_DIR, slug(&item.name)),
                        frontmatter::render(&doc),
                        item.kind(),
                        vec![item.clone()],
                    ));
                }
                ItemPayload::SimpleSkill { .. } | ItemPayload::FullSkill { .. } => {
                    let doc = self.skill_document(item);
                    let attachments = match &item.payload {
                        ItemPayload::FullSkill { files, .. } => files.clone(),
                        _ => Vec::new(),
                    };
                    plan.add(
                        PlannedFile::new(
                            format!("{}/{}/{}", SKILLS_DIR, slug(&item.name), SKILL_FILE),
                            frontmatter::render(&doc),
                            item.kind(),
                            vec![item.clone()],
                        )
                        .with_attachments(attachments),
                    );
                }
                ItemPayload::IgnoreList { .. } => plan.unsupported(item),
            }
        }

        if !memory.is_empty() {
            if memory.len() > 1 {
                plan.warn(
                    Warning::new(
                        WarningCode::Merged,
                        format!("Merged {} items into {}", memory.len(), MEMORY_FILE),
                    )
                    .with_sources(memory.iter().filter_map(|i| i.source_path.clone())),
                );
            }
            let content = self.memory_content(&memory, &mut plan);
            let kind = memory[0].kind();
            plan.add(PlannedFile::new(MEMORY_FILE, content, kind, memory));
        }

        plan.commit(workspace, options)
    }

    fn path_patterns(&self) -> Option<PathPatterns> {
        Some(PathPatterns::new([".claude/commands/", ".claude/skills/"], ["md"]))
    }
}
