//! Customization item model
//!
//! A customization item is one unit of agent configuration: a global
//! prompt, a skill, a file-triggered rule, an ignore list or a manually
//! invoked prompt. Kind-specific attributes live in [`ItemPayload`], a
//! closed set of variants, so every branch on item kind is checked by the
//! compiler.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::id::ItemId;

/// Kind of a customization item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Always-on instructions for the agent
    GlobalPrompt,

    /// A single-file skill
    SimpleSkill,

    /// A skill bundle with supporting files
    FullSkill,

    /// A rule that applies to files matching glob patterns
    FileRule,

    /// Paths the agent should ignore
    IgnoreList,

    /// A prompt the user invokes explicitly
    ManualPrompt,
}

impl ItemKind {
    /// Returns all item kinds
    pub fn all() -> &'static [ItemKind] {
        &[
            ItemKind::GlobalPrompt,
            ItemKind::SimpleSkill,
            ItemKind::FullSkill,
            ItemKind::FileRule,
            ItemKind::IgnoreList,
            ItemKind::ManualPrompt,
        ]
    }

    /// Prefix used in item IDs
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ItemKind::GlobalPrompt => "global",
            ItemKind::SimpleSkill => "skill",
            ItemKind::FullSkill => "full-skill",
            ItemKind::FileRule => "rule",
            ItemKind::IgnoreList => "ignore",
            ItemKind::ManualPrompt => "prompt",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::GlobalPrompt => write!(f, "global_prompt"),
            ItemKind::SimpleSkill => write!(f, "simple_skill"),
            ItemKind::FullSkill => write!(f, "full_skill"),
            ItemKind::FileRule => write!(f, "file_rule"),
            ItemKind::IgnoreList => write!(f, "ignore_list"),
            ItemKind::ManualPrompt => write!(f, "manual_prompt"),
        }
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "global_prompt" => Ok(ItemKind::GlobalPrompt),
            "simple_skill" => Ok(ItemKind::SimpleSkill),
            "full_skill" => Ok(ItemKind::FullSkill),
            "file_rule" => Ok(ItemKind::FileRule),
            "ignore_list" => Ok(ItemKind::IgnoreList),
            "manual_prompt" => Ok(ItemKind::ManualPrompt),
            _ => Err(format!("Unknown item kind: {}", s)),
        }
    }
}

/// A supporting file inside a skill bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillFile {
    /// Path relative to the skill directory, `/`-separated
    pub path: String,

    /// File content
    pub content: String,
}

/// Kind-specific attributes of an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemPayload {
    GlobalPrompt,

    SimpleSkill {
        description: String,
    },

    FullSkill {
        description: String,
        #[serde(default)]
        files: Vec<SkillFile>,
    },

    FileRule {
        globs: Vec<String>,
    },

    IgnoreList {
        patterns: Vec<String>,
    },

    ManualPrompt {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl ItemPayload {
    /// Returns the kind tag of this payload
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemPayload::GlobalPrompt => ItemKind::GlobalPrompt,
            ItemPayload::SimpleSkill { .. } => ItemKind::SimpleSkill,
            ItemPayload::FullSkill { .. } => ItemKind::FullSkill,
            ItemPayload::FileRule { .. } => ItemKind::FileRule,
            ItemPayload::IgnoreList { .. } => ItemKind::IgnoreList,
            ItemPayload::ManualPrompt { .. } => ItemKind::ManualPrompt,
        }
    }

    /// Returns the human description, if the kind carries one
    pub fn description(&self) -> Option<&str> {
        match self {
            ItemPayload::SimpleSkill { description }
            | ItemPayload::FullSkill { description, .. } => Some(description.as_str()),
            ItemPayload::ManualPrompt { description } => description.as_deref(),
            ItemPayload::GlobalPrompt
            | ItemPayload::FileRule { .. }
            | ItemPayload::IgnoreList { .. } => None,
        }
    }
}

/// Tool-specific fields preserved for round-tripping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta(BTreeMap<String, serde_json::Value>);

impl ItemMeta {
    /// Creates empty metadata
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Gets a value by key
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Sets a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns true if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all key-value pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }
}

/// One discrete unit of agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomizationItem {
    /// Deterministic identifier
    pub id: ItemId,

    /// Short name, used to name output files
    pub name: String,

    /// Textual content (frontmatter stripped)
    pub content: String,

    /// Where the item was discovered, relative to the source root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,

    /// Tool-specific fields
    #[serde(default, skip_serializing_if = "ItemMeta::is_empty")]
    pub metadata: ItemMeta,

    /// Kind-specific attributes
    #[serde(flatten)]
    pub payload: ItemPayload,
}

impl CustomizationItem {
    /// Creates an item discovered at `source_path`
    ///
    /// The ID is derived from the payload kind and the source path.
    pub fn new(
        name: impl Into<String>,
        payload: ItemPayload,
        content: impl Into<String>,
        source_path: impl Into<String>,
    ) -> Self {
        let source_path = normalize_path(&source_path.into());
        Self {
            id: ItemId::new(payload.kind(), &source_path),
            name: name.into(),
            content: content.into(),
            source_path: Some(source_path),
            metadata: ItemMeta::new(),
            payload,
        }
    }

    /// Creates an item with no source location (ID derived from the name)
    pub fn detached(
        name: impl Into<String>,
        payload: ItemPayload,
        content: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: ItemId::new(payload.kind(), &name),
            name,
            content: content.into(),
            source_path: None,
            metadata: ItemMeta::new(),
            payload,
        }
    }

    /// Returns the item kind
    pub fn kind(&self) -> ItemKind {
        self.payload.kind()
    }

    /// Returns a copy of this item with different content
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }
}

/// Normalizes a relative path to `/` separators without a leading `./`
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let mut trimmed = unified.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.to_string()
}
