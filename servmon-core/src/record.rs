// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Inventory records.
//!
//! A record is a flat bag of scalar fields. Values are one of three kinds;
//! anything else arriving through JSON or YAML is coerced to its string form
//! before it ever reaches the codec.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{InventoryError, InventoryResult};
use crate::types::{ServerId, KEY_FIELD};

/// Scalar field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
}

impl Value {
    /// Kind name used in log fields.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
        }
    }

    /// Lossy conversion from arbitrary JSON.
    ///
    /// Integers that do not fit in an i64 keep their exact decimal text as a
    /// string. Booleans, null, arrays and objects become their compact JSON
    /// text.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if n.is_u64() {
                    Self::Str(n.to_string())
                } else {
                    n.as_f64()
                        .map(Self::Float)
                        .unwrap_or_else(|| Self::Str(n.to_string()))
                }
            }
            other => Self::Str(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Self::from_json)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{}", s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{:?}", x),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

/// One server inventory record: field name to scalar value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    /// Parse a request body. The body must be a JSON object.
    pub fn from_json(body: &str) -> InventoryResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| InventoryError::MalformedBody {
                message: e.to_string(),
            })?;

        match value {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, Value::from_json(v)))
                .collect()),
            other => Err(InventoryError::MalformedBody {
                message: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Extract and validate the primary key.
    ///
    /// The key must be present and a non-empty string; a numeric `server_id`
    /// is rejected rather than coerced.
    pub fn server_id(&self) -> InventoryResult<ServerId> {
        match self.0.get(KEY_FIELD) {
            None => Err(InventoryError::MissingKey { field: KEY_FIELD }),
            Some(Value::Str(s)) => ServerId::new(s.as_str()).map_err(|e| {
                InventoryError::InvalidKey {
                    field: KEY_FIELD,
                    reason: e.to_string(),
                }
            }),
            Some(other) => Err(InventoryError::InvalidKey {
                field: KEY_FIELD,
                reason: format!("expected a string, got {}", other.kind()),
            }),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_kinds() {
        let record = Record::from_json(
            r#"{"server_id": "A", "memory": 1073741824, "load": 0.75, "iisPresent": "true"}"#,
        )
        .unwrap();

        assert_eq!(record.get("server_id"), Some(&Value::from("A")));
        assert_eq!(record.get("memory"), Some(&Value::Int(1073741824)));
        assert_eq!(record.get("load"), Some(&Value::Float(0.75)));
        assert_eq!(record.get("iisPresent"), Some(&Value::from("true")));
    }

    #[test]
    fn test_unsupported_json_types_are_stringified() {
        let record = Record::from_json(
            r#"{"server_id": "A", "up": true, "owner": null, "tags": ["a", 1], "huge": 18446744073709551615}"#,
        )
        .unwrap();

        assert_eq!(record.get("up"), Some(&Value::from("true")));
        assert_eq!(record.get("owner"), Some(&Value::from("null")));
        assert_eq!(record.get("tags"), Some(&Value::from(r#"["a",1]"#)));
        assert_eq!(record.get("huge"), Some(&Value::from("18446744073709551615")));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(matches!(
            Record::from_json("[1, 2]"),
            Err(InventoryError::MalformedBody { .. })
        ));
        assert!(matches!(
            Record::from_json("{not json"),
            Err(InventoryError::MalformedBody { .. })
        ));
    }

    #[test]
    fn test_empty_object_has_no_key() {
        let record = Record::from_json("{}").unwrap();
        assert!(record.is_empty());
        assert!(matches!(
            record.server_id(),
            Err(InventoryError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_server_id_extraction() {
        let ok: Record = [("server_id", "A")].into_iter().collect();
        assert_eq!(ok.server_id().unwrap().as_str(), "A");

        let missing: Record = [("memory", 1i64)].into_iter().collect();
        assert!(matches!(
            missing.server_id(),
            Err(InventoryError::MissingKey { .. })
        ));

        let empty: Record = [("server_id", "")].into_iter().collect();
        assert!(matches!(
            empty.server_id(),
            Err(InventoryError::InvalidKey { .. })
        ));

        let numeric: Record = [("server_id", 42i64)].into_iter().collect();
        assert!(matches!(
            numeric.server_id(),
            Err(InventoryError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_serialize_preserves_float_kind() {
        let record: Record = [("server_id", Value::from("A")), ("ratio", Value::Float(2.0))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"ratio":2.0,"server_id":"A"}"#);

        let back = Record::from_json(&json).unwrap();
        assert_eq!(back, record);
    }
}
