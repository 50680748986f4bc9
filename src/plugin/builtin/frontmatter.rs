//! YAML frontmatter for markdown-based rule and skill files
//!
//! Files may start with a `---` delimited YAML block followed by a markdown
//! body. Tools are loose about the YAML they accept (Cursor writes
//! `globs: *.ts` unquoted, which is not valid YAML), so a simple
//! `key: value` reader is used when strict parsing fails.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FrontmatterError {
    #[error("Missing frontmatter end delimiter (---)")]
    Unterminated,

    #[error("Malformed frontmatter line {line}: {text}")]
    Malformed { line: usize, text: String },
}

/// A markdown document split into frontmatter and body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub frontmatter: Mapping,
    pub body: String,
}

impl Document {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            frontmatter: Mapping::new(),
            body: body.into(),
        }
    }

    /// Gets a frontmatter value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.frontmatter.get(key)
    }

    /// Gets a frontmatter string by key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Sets a frontmatter value
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.frontmatter.insert(Value::from(key), value.into());
    }

    /// Removes a key and returns its value
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.frontmatter.remove(key)
    }
}

/// Parses a markdown file with optional frontmatter
pub fn parse(content: &str) -> Result<Document, FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut lines = content.split_inclusive('\n');
    let first = match lines.next() {
        Some(line) if line.trim_end() == "---" => line,
        _ => return Ok(Document::new(content.trim())),
    };

    let mut yaml = String::new();
    let mut consumed = first.len();
    let mut closed = false;

    for line in lines {
        consumed += line.len();
        if line.trim_end() == "---" {
            closed = true;
            break;
        }
        yaml.push_str(line);
    }

    if !closed {
        return Err(FrontmatterError::Unterminated);
    }

    let frontmatter = parse_yaml(&yaml)?;
    let body = content[consumed..].trim().to_string();

    Ok(Document { frontmatter, body })
}

fn parse_yaml(yaml: &str) -> Result<Mapping, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }

    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(map)) => Ok(map),
        Ok(Value::Null) => Ok(Mapping::new()),
        _ => parse_loose(yaml),
    }
}

/// Reads `key: value` lines, keeping values as plain strings
fn parse_loose(yaml: &str) -> Result<Mapping, FrontmatterError> {
    let mut map = Mapping::new();

    for (index, line) in yaml.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key, value) = trimmed.split_once(':').ok_or_else(|| FrontmatterError::Malformed {
            line: index + 2,
            text: trimmed.to_string(),
        })?;

        let value = value.trim();
        let value = match value {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "" => Value::Null,
            other => Value::String(other.to_string()),
        };
        map.insert(Value::from(key.trim()), value);
    }

    Ok(map)
}

/// Renders a document back to markdown
pub fn render(doc: &Document) -> String {
    let mut content = String::new();

    if !doc.frontmatter.is_empty() {
        let yaml = serde_yaml::to_string(&doc.frontmatter).unwrap_or_default();
        content.push_str("---\n");
        content.push_str(&yaml);
        if !yaml.ends_with('\n') {
            content.push('\n');
        }
        content.push_str("---\n\n");
    }

    content.push_str(&doc.body);

    if !content.ends_with('\n') {
        content.push('\n');
    }

    content
}

/// Converts a YAML value to JSON for item metadata
pub fn to_json(value: &Value) -> Option<serde_json::Value> {
    serde_json::to_value(value).ok()
}

/// Converts item metadata JSON back to YAML
pub fn from_json(value: &serde_json::Value) -> Option<Value> {
    serde_yaml::to_value(value).ok()
}

/// Reads a string-or-list field as a list of trimmed strings
///
/// Strings are split on commas, as Cursor writes `globs: a, b`.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Sequence(seq)) => seq
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Reads a boolean field, accepting `"true"` strings
pub fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_without_frontmatter() {
        let doc = parse("# Title\n\nBody\n").unwrap();
        assert!(doc.frontmatter.is_empty());
        assert_eq!(doc.body, "# Title\n\nBody");
    }

    #[test]
    fn parse_with_frontmatter() {
        let doc =
            parse("---\ndescription: Style rules\nalwaysApply: true\n---\n\nUse tabs.\n").unwrap();

        assert_eq!(doc.get_str("description"), Some("Style rules"));
        assert!(flag(doc.get("alwaysApply")));
        assert_eq!(doc.body, "Use tabs.");
    }

    #[test]
    fn body_may_contain_delimiters() {
        let doc = parse("---\na: 1\n---\nabove\n---\nbelow\n").unwrap();
        assert_eq!(doc.body, "above\n---\nbelow");
    }

    #[test]
    fn unterminated_frontmatter_is_an_error() {
        assert_eq!(parse("---\na: 1\nbody"), Err(FrontmatterError::Unterminated));
    }

    #[test]
    fn loose_parse_handles_unquoted_globs() {
        let doc = parse("---\nglobs: *.ts, src/**/*.tsx\nalwaysApply: false\n---\nBody").unwrap();

        assert_eq!(
            string_list(doc.get("globs")),
            vec!["*.ts".to_string(), "src/**/*.tsx".to_string()]
        );
        assert!(!flag(doc.get("alwaysApply")));
    }

    #[test]
    fn loose_parse_rejects_garbage() {
        let err = parse("---\n*: [\nnot a pair\n---\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::Malformed { .. }));
    }

    #[test]
    fn string_list_accepts_sequences() {
        let doc = parse("---\nglobs:\n  - \"*.rs\"\n  - \"*.toml\"\n---\n").unwrap();
        assert_eq!(string_list(doc.get("globs")), vec!["*.rs", "*.toml"]);
        assert!(string_list(doc.get("missing")).is_empty());
    }

    #[test]
    fn render_roundtrip() {
        let mut doc = Document::new("Body text");
        doc.set("description", "Testing");
        doc.set("alwaysApply", true);

        let rendered = render(&doc);
        assert!(rendered.starts_with("---\n"));
        assert!(rendered.ends_with("Body text\n"));

        let parsed = parse(&rendered).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn render_without_frontmatter_is_plain_body() {
        assert_eq!(render(&Document::new("Just text")), "Just text\n");
    }

    #[test]
    fn json_conversion() {
        let yaml = Value::from("x");
        let json = to_json(&yaml).unwrap();
        assert_eq!(json, serde_json::json!("x"));
        assert_eq!(from_json(&json), Some(yaml));
    }
}
