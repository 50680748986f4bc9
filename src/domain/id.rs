//! Deterministic identifiers for customization items
//!
//! ID Format: `{kind-prefix}-{7-char-hash}` (e.g., `rule-7f2b4c1`)
//!
//! The hash is derived from the item kind and its source location, so
//! rediscovering the same file always yields the same ID. Two tools may
//! still produce colliding IDs within one batch; callers that need
//! uniqueness must check for it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::item::ItemKind;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid item ID format: expected '{{kind}}-{{7-char-hash}}', got '{0}'")]
    InvalidItemId(String),

    #[error("Unknown item ID prefix: {0}")]
    UnknownPrefix(String),
}

/// Generates a 7-character hash from the kind and location
fn generate_hash(kind: ItemKind, location: &str) -> String {
    let input = format!("{}:{}", kind, location);
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

/// Item ID in the format `{kind-prefix}-{7-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId {
    kind: ItemKind,
    hash: String,
}

impl ItemId {
    /// Creates an ID from the item kind and its location (source path or name)
    pub fn new(kind: ItemKind, location: &str) -> Self {
        Self {
            kind,
            hash: generate_hash(kind, location),
        }
    }

    /// Returns the kind encoded in the ID prefix
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Returns the hash portion of the ID
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.id_prefix(), self.hash)
    }
}

impl FromStr for ItemId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (prefix, hash) = s
            .rsplit_once('-')
            .ok_or_else(|| IdError::InvalidItemId(s.to_string()))?;

        if hash.len() != 7 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::InvalidItemId(s.to_string()));
        }

        let kind = ItemKind::all()
            .iter()
            .copied()
            .find(|k| k.id_prefix() == prefix)
            .ok_or_else(|| IdError::UnknownPrefix(prefix.to_string()))?;

        Ok(Self {
            kind,
            hash: hash.to_lowercase(),
        })
    }
}

impl TryFrom<String> for ItemId {
    type Error = IdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.to_string()
    }
}
