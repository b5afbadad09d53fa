//! Parse options and their YAML loading.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Failed to read options file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Knobs for a single parse.
///
/// ```yaml
/// memoize: true
/// max_expressions: 200000
/// entrypoint: Document
/// initial_state:
///   depth: 0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Cache rule results per position
    #[serde(default)]
    pub memoize: bool,

    /// Abort once this many expressions have been evaluated
    #[serde(default)]
    pub max_expressions: Option<u64>,

    /// Substitute U+FFFD for invalid UTF-8 instead of failing
    #[serde(default)]
    pub allow_invalid_utf8: bool,

    /// Rule to start from; the grammar's first rule when unset
    #[serde(default)]
    pub entrypoint: Option<String>,

    #[serde(default)]
    pub initial_state: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub global_store: BTreeMap<String, serde_json::Value>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, OptionsError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, OptionsError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn with_memoization(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    pub fn with_max_expressions(mut self, limit: u64) -> Self {
        self.max_expressions = Some(limit);
        self
    }

    pub fn with_invalid_utf8(mut self, allow: bool) -> Self {
        self.allow_invalid_utf8 = allow;
        self
    }

    pub fn with_entrypoint(mut self, rule: impl Into<String>) -> Self {
        self.entrypoint = Some(rule.into());
        self
    }

    pub fn with_state(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.initial_state.insert(key.into(), value);
        self
    }

    pub fn with_global(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.global_store.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::default();
        assert!(!options.memoize);
        assert!(options.max_expressions.is_none());
        assert!(!options.allow_invalid_utf8);
        assert!(options.entrypoint.is_none());
    }

    #[test]
    fn test_from_yaml_partial() {
        let options = ParseOptions::from_yaml(
            "memoize: true\nmax_expressions: 10\ninitial_state:\n  depth: 2\n",
        )
        .unwrap();
        assert!(options.memoize);
        assert_eq!(options.max_expressions, Some(10));
        assert_eq!(options.initial_state["depth"], json!(2));
        assert!(options.global_store.is_empty());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "entrypoint: InlineContent\nallow_invalid_utf8: true").unwrap();
        let options = ParseOptions::from_file(file.path()).unwrap();
        assert_eq!(options.entrypoint.as_deref(), Some("InlineContent"));
        assert!(options.allow_invalid_utf8);
    }

    #[test]
    fn test_from_file_missing() {
        let result = ParseOptions::from_file("/definitely/not/here.yml");
        assert!(matches!(result, Err(OptionsError::ReadError(_))));
    }

    #[test]
    fn test_builders() {
        let options = ParseOptions::new()
            .with_memoization(true)
            .with_max_expressions(5)
            .with_entrypoint("Start")
            .with_state("k", json!("v"))
            .with_global("g", json!(true));
        assert_eq!(options.entrypoint.as_deref(), Some("Start"));
        assert_eq!(options.global_store["g"], json!(true));
        assert_eq!(options.initial_state.len(), 1);
    }
}
