//! Front matter decoding.
//!
//! The grammar only extracts the raw text between the `---` lines; turning
//! it into attributes is delegated to a [`FrontMatterDecoder`].

use serde_yaml::{Mapping, Value as YamlValue};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Front matter must be a mapping, found {0}")]
    NotAMapping(String),
}

/// Decodes a raw front matter payload.
pub trait FrontMatterDecoder: Send + Sync {
    fn decode(&self, raw: &str) -> Result<Mapping, FrontMatterError>;
}

/// YAML decoder; an empty payload yields an empty mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFrontMatterDecoder;

impl FrontMatterDecoder for YamlFrontMatterDecoder {
    fn decode(&self, raw: &str) -> Result<Mapping, FrontMatterError> {
        match serde_yaml::from_str::<YamlValue>(raw)? {
            YamlValue::Null => Ok(Mapping::new()),
            YamlValue::Mapping(mapping) => Ok(mapping),
            other => Err(FrontMatterError::NotAMapping(kind_of(&other).to_string())),
        }
    }
}

fn kind_of(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "a boolean",
        YamlValue::Number(_) => "a number",
        YamlValue::String(_) => "a string",
        YamlValue::Sequence(_) => "a sequence",
        YamlValue::Mapping(_) => "a mapping",
        YamlValue::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mapping() {
        let mapping = YamlFrontMatterDecoder
            .decode("title: Test Post\ntags:\n  - rust\n")
            .unwrap();
        assert_eq!(
            mapping.get("title"),
            Some(&YamlValue::String("Test Post".to_string()))
        );
        assert!(matches!(mapping.get("tags"), Some(YamlValue::Sequence(tags)) if tags.len() == 1));
    }

    #[test]
    fn test_decode_empty() {
        assert!(YamlFrontMatterDecoder.decode("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_scalar_is_rejected() {
        let err = YamlFrontMatterDecoder.decode("just text").unwrap_err();
        assert_eq!(err.to_string(), "Front matter must be a mapping, found a string");
    }

    #[test]
    fn test_decode_invalid_yaml() {
        let err = YamlFrontMatterDecoder.decode("title: [unclosed").unwrap_err();
        assert!(matches!(err, FrontMatterError::YamlError(_)));
    }
}
