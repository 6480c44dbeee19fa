//! # Record Keys
//!
//! Wire format for primary keys in URLs. A single-attribute key is the raw
//! path segment. A composite key is the attribute values joined by a
//! delimiter (`,` by default) in primary-key declaration order, and must
//! split into exactly as many parts as the key has attributes.

use serde_json::Value;
use thiserror::Error;

/// Default delimiter between composite key parts
pub const DEFAULT_KEY_DELIMITER: &str = ",";

/// Key parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Key value or one of its parts is empty
    #[error("Empty key value")]
    Empty,

    /// Composite key split into the wrong number of parts
    #[error("expected {expected} key parts, got {actual}")]
    PartCount { expected: usize, actual: usize },

    /// The resource declares no primary key at all
    #[error("Resource has no primary key")]
    NoPrimaryKey,
}

/// A resolved primary key: ordered (attribute, value) pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    parts: Vec<(String, String)>,
}

impl RecordKey {
    /// Parse a raw key from the URL against the resource's primary key
    pub fn parse(raw: &str, primary_key: &[String], delimiter: &str) -> Result<Self, KeyError> {
        if primary_key.is_empty() {
            return Err(KeyError::NoPrimaryKey);
        }
        if raw.is_empty() {
            return Err(KeyError::Empty);
        }

        if primary_key.len() == 1 {
            return Ok(Self {
                parts: vec![(primary_key[0].clone(), raw.to_string())],
            });
        }

        let values: Vec<&str> = raw.split(delimiter).collect();
        if values.len() != primary_key.len() {
            return Err(KeyError::PartCount {
                expected: primary_key.len(),
                actual: values.len(),
            });
        }
        if values.iter().any(|v| v.is_empty()) {
            return Err(KeyError::Empty);
        }

        Ok(Self {
            parts: primary_key
                .iter()
                .cloned()
                .zip(values.into_iter().map(str::to_string))
                .collect(),
        })
    }

    /// Extract the key of an existing record
    pub fn from_record(record: &Value, primary_key: &[String]) -> Option<Self> {
        if primary_key.is_empty() {
            return None;
        }
        let parts = primary_key
            .iter()
            .map(|attr| {
                record
                    .get(attr)
                    .and_then(scalar_to_string)
                    .map(|value| (attr.clone(), value))
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self { parts })
    }

    /// Ordered (attribute, value) pairs
    pub fn parts(&self) -> &[(String, String)] {
        &self.parts
    }

    /// Value for one key attribute
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.parts
            .iter()
            .find(|(attr, _)| attr == attribute)
            .map(|(_, value)| value.as_str())
    }

    /// Encode back to the URL form
    pub fn encode(&self, delimiter: &str) -> String {
        self.parts
            .iter()
            .map(|(_, value)| value.as_str())
            .collect::<Vec<_>>()
            .join(delimiter)
    }

    /// Check whether a record carries this key
    pub fn matches(&self, record: &Value) -> bool {
        self.parts.iter().all(|(attr, value)| {
            record
                .get(attr)
                .and_then(scalar_to_string)
                .map(|v| v == *value)
                .unwrap_or(false)
        })
    }
}

/// String form of a scalar JSON value; `None` for null, arrays and objects
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pk(attrs: &[&str]) -> Vec<String> {
        attrs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_key_keeps_delimiter() {
        let key = RecordKey::parse("a,b", &pk(&["slug"]), ",").unwrap();
        assert_eq!(key.get("slug"), Some("a,b"));
    }

    #[test]
    fn test_composite_key() {
        let key = RecordKey::parse("42,7", &pk(&["tenant", "id"]), ",").unwrap();
        assert_eq!(
            key.parts(),
            &[
                ("tenant".to_string(), "42".to_string()),
                ("id".to_string(), "7".to_string())
            ]
        );
        assert_eq!(key.encode(","), "42,7");
    }

    #[test]
    fn test_composite_key_part_count_mismatch() {
        let err = RecordKey::parse("42", &pk(&["tenant", "id"]), ",").unwrap_err();
        assert_eq!(err, KeyError::PartCount { expected: 2, actual: 1 });

        let err = RecordKey::parse("1,2,3", &pk(&["tenant", "id"]), ",").unwrap_err();
        assert_eq!(err, KeyError::PartCount { expected: 2, actual: 3 });
    }

    #[test]
    fn test_empty_parts_rejected() {
        assert_eq!(
            RecordKey::parse("", &pk(&["id"]), ","),
            Err(KeyError::Empty)
        );
        assert_eq!(
            RecordKey::parse("42,", &pk(&["tenant", "id"]), ","),
            Err(KeyError::Empty)
        );
        assert_eq!(RecordKey::parse("1", &[], ","), Err(KeyError::NoPrimaryKey));
    }

    #[test]
    fn test_custom_delimiter() {
        let key = RecordKey::parse("42|7", &pk(&["tenant", "id"]), "|").unwrap();
        assert_eq!(key.get("id"), Some("7"));
    }

    #[test]
    fn test_matches_numeric_attributes() {
        let key = RecordKey::parse("42,7", &pk(&["tenant", "id"]), ",").unwrap();
        assert!(key.matches(&json!({"tenant": 42, "id": 7, "name": "x"})));
        assert!(key.matches(&json!({"tenant": "42", "id": "7"})));
        assert!(!key.matches(&json!({"tenant": 42, "id": 8})));
        assert!(!key.matches(&json!({"tenant": 42})));
    }

    #[test]
    fn test_from_record() {
        let key = RecordKey::from_record(&json!({"tenant": 1, "id": "a"}), &pk(&["tenant", "id"]))
            .unwrap();
        assert_eq!(key.encode(","), "1,a");
        assert!(RecordKey::from_record(&json!({"tenant": 1}), &pk(&["tenant", "id"])).is_none());
    }
}
