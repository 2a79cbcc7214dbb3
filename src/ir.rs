use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Input files looked for by [`resolve_input`], most preferred first.
pub const INPUT_CANDIDATES: [&str; 2] = ["tree_clean.json", "tree.json"];

/// One untrusted input record. Every field may be a string, a number, `null`
/// or missing entirely.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default, rename = "parentId")]
    pub parent_id: Value,
    #[serde(default)]
    pub name: Value,
}

impl RawRecord {
    pub fn new(id: impl Into<Value>, parent_id: impl Into<Value>, name: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            name: name.into(),
        }
    }
}

/// A canonical genealogical record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
    pub name: String,
}

impl Node {
    pub fn new(id: &str, parent_id: Option<&str>, name: &str) -> Self {
        Self {
            id: id.to_string(),
            parent_id: parent_id.map(str::to_string),
            name: name.to_string(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Label shown for the node: its name, or its id when unnamed.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Converts a dynamic id value into the canonical string form.
///
/// Strings are trimmed; an empty result or the literal `null` yields `None`.
/// Numbers keep their JSON text (`5`, `5.5`). Arrays and objects are not ids.
pub fn normalize_id(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => return None,
    };
    if text.is_empty() || text == "null" {
        None
    } else {
        Some(text)
    }
}

pub(crate) fn normalize_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

pub fn parse_records(input: &str) -> serde_json::Result<Vec<RawRecord>> {
    serde_json::from_str(input)
}

pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_records(&contents)?)
}

/// Picks the cleaned file in `dir` when present, the raw one otherwise.
pub fn resolve_input(dir: &Path) -> Result<PathBuf> {
    let candidates: Vec<PathBuf> = INPUT_CANDIDATES.iter().map(|name| dir.join(name)).collect();
    match candidates.iter().find(|path| path.is_file()) {
        Some(path) => Ok(path.clone()),
        None => Err(Error::MissingInputFile { candidates }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_id_handles_dynamic_values() {
        assert_eq!(normalize_id(&json!("  42 ")), Some("42".to_string()));
        assert_eq!(normalize_id(&json!(42)), Some("42".to_string()));
        assert_eq!(normalize_id(&json!(4.5)), Some("4.5".to_string()));
        assert_eq!(normalize_id(&json!("null")), None);
        assert_eq!(normalize_id(&json!("   ")), None);
        assert_eq!(normalize_id(&Value::Null), None);
        assert_eq!(normalize_id(&json!({"a": 1})), None);
    }

    #[test]
    fn parses_records_with_missing_fields() {
        let records = parse_records(r#"[{"id": 1}, {"id": "2", "parentId": 1, "name": null}]"#)
            .expect("records should parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].parent_id, Value::Null);
        assert_eq!(records[1].parent_id, json!(1));
    }

    #[test]
    fn node_label_falls_back_to_id() {
        assert_eq!(Node::new("7", None, "").label(), "7");
        assert_eq!(Node::new("7", None, "Hawiye").label(), "Hawiye");
    }

    #[test]
    fn resolve_input_prefers_clean_file() {
        let dir = std::env::temp_dir().join(format!("lineage-input-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let _ = std::fs::remove_file(dir.join("tree_clean.json"));
        let _ = std::fs::remove_file(dir.join("tree.json"));

        assert!(matches!(
            resolve_input(&dir),
            Err(Error::MissingInputFile { candidates }) if candidates.len() == 2
        ));
        std::fs::write(dir.join("tree.json"), "[]").unwrap();
        assert_eq!(resolve_input(&dir).unwrap(), dir.join("tree.json"));
        std::fs::write(dir.join("tree_clean.json"), "[]").unwrap();
        assert_eq!(resolve_input(&dir).unwrap(), dir.join("tree_clean.json"));
        assert!(read_records(&dir.join("tree_clean.json")).unwrap().is_empty());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
