//! Non-fatal conversion warnings

use serde::{Deserialize, Serialize};

/// Closed set of warning codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    /// Several items were merged into one output file
    Merged,

    /// The target format can only approximate the item
    Approximated,

    /// A feature or item was skipped
    Skipped,

    /// An existing file was overwritten
    Overwritten,

    /// An output file was renamed to avoid a collision
    Renamed,

    /// A path-shaped reference has no mapping entry
    OrphanReference,

    /// A source file could not be read or parsed
    Unreadable,
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningCode::Merged => write!(f, "merged"),
            WarningCode::Approximated => write!(f, "approximated"),
            WarningCode::Skipped => write!(f, "skipped"),
            WarningCode::Overwritten => write!(f, "overwritten"),
            WarningCode::Renamed => write!(f, "renamed"),
            WarningCode::OrphanReference => write!(f, "orphan_reference"),
            WarningCode::Unreadable => write!(f, "unreadable"),
        }
    }
}

/// A non-fatal conversion note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub code: WarningCode,

    /// Human-readable message
    pub message: String,

    /// Source paths implicated in the warning
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,

    /// Structured details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Warning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            sources: Vec::new(),
            details: None,
        }
    }

    /// Adds implicated source paths
    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources.extend(sources.into_iter().map(Into::into));
        self
    }

    /// Attaches structured details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}
