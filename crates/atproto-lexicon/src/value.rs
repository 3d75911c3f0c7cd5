//! Runtime values checked against Lexicon schemas
//!
//! `LexValue` is the untyped, JSON-like input the validation engine walks.
//! It extends the JSON data model with the two IPLD kinds Lexicon can
//! describe: raw byte strings and CID links.

use cid::Cid;
use indexmap::IndexMap;

/// An untyped value in the Lexicon data model
#[derive(Debug, Clone, PartialEq)]
pub enum LexValue {
    /// JSON `null`
    Null,

    /// Boolean
    Bool(bool),

    /// Whole number
    Integer(i64),

    /// Number with a fractional part, or one outside the `i64` range
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Raw byte string
    Bytes(Vec<u8>),

    /// Content identifier link
    CidLink(Cid),

    /// Ordered list of values
    Array(Vec<LexValue>),

    /// Map of property names to values, in insertion order
    Object(IndexMap<String, LexValue>),
}

impl LexValue {
    /// Human-readable name of the value's kind
    pub fn type_name(&self) -> &'static str {
        match self {
            LexValue::Null => "null",
            LexValue::Bool(_) => "boolean",
            LexValue::Integer(_) => "integer",
            LexValue::Float(_) => "number",
            LexValue::String(_) => "string",
            LexValue::Bytes(_) => "bytes",
            LexValue::CidLink(_) => "cid-link",
            LexValue::Array(_) => "array",
            LexValue::Object(_) => "object",
        }
    }

    /// Get the value as an object map
    pub fn as_object(&self) -> Option<&IndexMap<String, LexValue>> {
        match self {
            LexValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Get the value as a mutable object map
    pub fn as_object_mut(&mut self) -> Option<&mut IndexMap<String, LexValue>> {
        match self {
            LexValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LexValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a property when the value is an object
    pub fn get(&self, key: &str) -> Option<&LexValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Check if the value is any kind of number
    pub fn is_number(&self) -> bool {
        matches!(self, LexValue::Integer(_) | LexValue::Float(_))
    }

    /// Get the value as a whole number
    ///
    /// Floats with no fractional part are accepted when they fit in `i64`,
    /// so `2.0` read from JSON counts as the integer `2`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            LexValue::Integer(n) => Some(*n),
            LexValue::Float(f)
                if f.is_finite()
                    && f.fract() == 0.0
                    && *f >= i64::MIN as f64
                    && *f < i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            _ => None,
        }
    }
}

impl From<serde_json::Value> for LexValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => LexValue::Null,
            serde_json::Value::Bool(b) => LexValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => LexValue::Integer(i),
                None => LexValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => LexValue::String(s),
            serde_json::Value::Array(items) => {
                LexValue::Array(items.into_iter().map(LexValue::from).collect())
            }
            serde_json::Value::Object(map) => LexValue::Object(
                map.into_iter()
                    .map(|(key, value)| (key, LexValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for LexValue {
    fn from(value: bool) -> Self {
        LexValue::Bool(value)
    }
}

impl From<i64> for LexValue {
    fn from(value: i64) -> Self {
        LexValue::Integer(value)
    }
}

impl From<&str> for LexValue {
    fn from(value: &str) -> Self {
        LexValue::String(value.to_string())
    }
}

impl From<String> for LexValue {
    fn from(value: String) -> Self {
        LexValue::String(value)
    }
}

impl From<Vec<u8>> for LexValue {
    fn from(value: Vec<u8>) -> Self {
        LexValue::Bytes(value)
    }
}

impl From<Cid> for LexValue {
    fn from(value: Cid) -> Self {
        LexValue::CidLink(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(LexValue::from(json!(123)), LexValue::Integer(123));
        assert_eq!(LexValue::from(json!(1.5)), LexValue::Float(1.5));
        assert_eq!(LexValue::from(json!(-7)), LexValue::Integer(-7));
    }

    #[test]
    fn test_from_json_keeps_property_order() {
        let value = LexValue::from(json!({ "b": 1, "a": 2 }));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&"a".to_string()));
        assert!(keys.contains(&"b".to_string()));
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(LexValue::Integer(4).as_integer(), Some(4));
        assert_eq!(LexValue::Float(2.0).as_integer(), Some(2));
        assert_eq!(LexValue::Float(2.5).as_integer(), None);
        assert_eq!(LexValue::Float(f64::INFINITY).as_integer(), None);
        assert_eq!(LexValue::Bool(true).as_integer(), None);
    }

    #[test]
    fn test_get_and_type_name() {
        let value = LexValue::from(json!({ "$type": "com.example.post" }));
        assert_eq!(value.get("$type").and_then(LexValue::as_str), Some("com.example.post"));
        assert_eq!(value.type_name(), "object");
        assert_eq!(LexValue::Bytes(vec![1]).type_name(), "bytes");
        assert!(LexValue::Null.get("x").is_none());
    }
}
