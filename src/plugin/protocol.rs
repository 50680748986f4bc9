//! Plugin protocol types
//!
//! External plugins communicate via JSON messages over stdin/stdout.
//! Each plugin must support the `--manifest` flag to declare capabilities.

use serde::{Deserialize, Serialize};

use super::traits::PathPatterns;
use crate::domain::ItemKind;

/// Operations every conversion plugin must support
pub const REQUIRED_OPERATIONS: &[&str] = &["discover", "emit"];

/// Plugin manifest declaring capabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugin ID (e.g., "windsurf")
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Plugin version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Supported item kinds
    pub kinds: Vec<ItemKind>,

    /// Supported operations
    pub operations: Vec<String>,

    /// Path reference hints for orphan detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_patterns: Option<PathPatterns>,
}

/// A message sent to a plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRequest {
    /// The operation to perform
    pub operation: String,

    /// Operation-specific parameters
    pub params: serde_json::Value,
}

impl PluginRequest {
    pub fn new(operation: impl Into<String>, params: impl Into<serde_json::Value>) -> Self {
        Self {
            operation: operation.into(),
            params: params.into(),
        }
    }
}

/// A response from a plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginResponse {
    /// Whether the operation succeeded
    pub success: bool,

    /// Result data (if success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Error message (if failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Checks a raw manifest value against the plugin shape
///
/// Every problem found is reported, not just the first one.
pub fn validate_manifest(value: &serde_json::Value) -> Result<PluginManifest, Vec<String>> {
    let mut problems = Vec::new();

    let Some(obj) = value.as_object() else {
        return Err(vec!["manifest must be a JSON object".to_string()]);
    };

    for field in ["id", "name"] {
        match obj.get(field) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {}
            Some(serde_json::Value::String(_)) => {
                problems.push(format!("'{}' must not be empty", field))
            }
            Some(_) => problems.push(format!("'{}' must be a string", field)),
            None => problems.push(format!("missing '{}'", field)),
        }
    }

    match obj.get("kinds") {
        Some(serde_json::Value::Array(kinds)) => {
            for kind in kinds {
                match kind.as_str() {
                    Some(s) if s.parse::<ItemKind>().is_ok() => {}
                    Some(s) => problems.push(format!("unknown kind '{}'", s)),
                    None => problems.push("'kinds' entries must be strings".to_string()),
                }
            }
        }
        Some(_) => problems.push("'kinds' must be an array".to_string()),
        None => problems.push("missing 'kinds'".to_string()),
    }

    match obj.get("operations") {
        Some(serde_json::Value::Array(ops)) => {
            for required in REQUIRED_OPERATIONS {
                if !ops.iter().any(|op| op.as_str() == Some(required)) {
                    problems.push(format!("missing required operation '{}'", required));
                }
            }
        }
        Some(_) => problems.push("'operations' must be an array".to_string()),
        None => problems.push("missing 'operations'".to_string()),
    }

    if let Some(version) = obj.get("version") {
        if !version.is_string() && !version.is_null() {
            problems.push("'version' must be a string".to_string());
        }
    }

    if !problems.is_empty() {
        return Err(problems);
    }

    serde_json::from_value(value.clone()).map_err(|e| vec![e.to_string()])
}
