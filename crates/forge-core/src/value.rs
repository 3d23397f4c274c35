//! Property values and the structured-value codec
//!
//! Stores only hold scalars, so structured data (objects and arrays) travels
//! as JSON text in the raw property bag. [`decode`] turns a raw value back
//! into a [`Value`] and [`Value::encode`] produces the stored form.

use crate::node::PropertyBag;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Decoded properties of a mapped object
pub type PropertyMap = BTreeMap<String, Value>;

/// Characters whose presence marks a stored string as structured JSON text
const STRUCTURE_MARKERS: [char; 4] = ['{', '}', '[', ']'];

/// A decoded property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    /// Object or array decoded from JSON text
    Structured(serde_json::Value),
}

impl Value {
    /// Stored form of this value
    pub fn encode(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Structured(v) => serde_json::Value::String(v.to_string()),
        }
    }

    /// Null or the empty string; such values count as missing or cleared
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Structured(v) => Some(v),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Structured(_) => 4,
        }
    }

    /// Total order used for sorting: null < bool < number < string < structured
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => {
                let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Structured(a), Value::Structured(b)) => a.to_string().cmp(&b.to_string()),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Decode a raw stored value
///
/// Strings containing any of `{ } [ ]` are parsed as JSON. Text that looks
/// structured but does not parse is kept as a plain string.
pub fn decode(raw: &serde_json::Value) -> Value {
    match raw {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.clone()),
        serde_json::Value::String(s) if s.contains(STRUCTURE_MARKERS) => {
            match serde_json::from_str::<serde_json::Value>(s) {
                Ok(parsed) => Value::from(parsed),
                Err(e) => {
                    tracing::debug!("Keeping undecodable structured text as string: {}", e);
                    Value::String(s.clone())
                }
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        other => Value::Structured(other.clone()),
    }
}

/// Decode every entry of a raw property bag
pub fn decode_bag(bag: &PropertyBag) -> PropertyMap {
    bag.iter().map(|(k, v)| (k.clone(), decode(v))).collect()
}

/// Encode every entry of a property map into its stored form
pub fn encode_map(map: &PropertyMap) -> PropertyBag {
    map.iter().map(|(k, v)| (k.clone(), v.encode())).collect()
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            structured => Value::Structured(structured),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

/// NaN and the infinities have no stored form and become `Null`, which a
/// save treats as clearing the property
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        match serde_json::Number::from_f64(n) {
            Some(number) => Value::Number(number),
            None => {
                tracing::warn!("Non-finite number {} stored as null", n);
                Value::Null
            }
        }
    }
}
