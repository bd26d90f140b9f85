//! Tagged value sum for telemetry entries.
//!
//! The encoder accepts a heterogeneous value per key. Strings, numbers
//! and booleans survive a round-trip structurally; anything else is
//! carried through [`Value::Other`] with canonical JSON stringification
//! and best-effort recovery on the way back.

use serde::{Deserialize, Serialize};

/// A telemetry entry value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Nested objects, arrays, or anything else JSON-serialisable.
    Other(serde_json::Value),
}

impl Value {
    /// Canonical JSON text for this value.
    ///
    /// Numbers use their shortest decimal form, strings are quoted and
    /// escaped. Returns `None` for values that cannot be serialised,
    /// i.e. non-finite floats.
    pub(crate) fn to_json_text(&self) -> Option<String> {
        match self {
            Value::Null => Some("null".to_owned()),
            Value::Bool(true) => Some("true".to_owned()),
            Value::Bool(false) => Some("false".to_owned()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) if f.is_finite() => {
                Some(serde_json::to_string(f).expect("finite f64 serialises"))
            }
            Value::Float(_) => None,
            Value::Str(s) => Some(serde_json::to_string(s).expect("str serialises")),
            Value::Other(v) => serde_json::to_string(v).ok(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Other(v)
    }
}
