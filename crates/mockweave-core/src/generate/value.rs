use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// One generated record: field name to value, in model field order.
pub type Record = IndexMap<String, Value>;

/// A generated field value.
///
/// The `String` variant uses `Cow<'static, str>` so that values drawn from
/// static lookup tables (statuses, currencies, roles) are held as borrows,
/// while dynamically generated values (emails, names) are owned.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Cow<'static, str>),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Uuid(Uuid),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
    /// Scalar lists and embedded relation id lists.
    Array(Vec<Value>),
}

impl Value {
    pub fn owned(s: impl Into<String>) -> Self {
        Value::String(Cow::Owned(s.into()))
    }

    pub fn borrowed(s: &'static str) -> Self {
        Value::String(Cow::Borrowed(s))
    }

    /// Plain JSON rendering: timestamps as ISO-8601, bytes as hex.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as J;
        match self {
            Value::Null => J::Null,
            Value::Bool(b) => J::Bool(*b),
            Value::Int(i) => J::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(J::Number)
                .unwrap_or(J::Null),
            Value::String(s) => J::String(s.to_string()),
            Value::Timestamp(ts) => J::String(ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
            Value::Date(d) => J::String(d.format("%Y-%m-%d").to_string()),
            Value::Uuid(u) => J::String(u.to_string()),
            Value::Json(j) => j.clone(),
            Value::Bytes(b) => J::String(hex_encode(b)),
            Value::Array(items) => J::Array(items.iter().map(Value::to_json).collect()),
        }
    }

    /// Inverse of [`Value::to_json`] for user-supplied values (config, JSON
    /// input). Objects stay JSON; strings stay strings.
    pub fn from_json(json: &serde_json::Value) -> Self {
        use serde_json::Value as J;
        match json {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(*b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            J::String(s) => Value::owned(s.clone()),
            J::Array(items) => Value::Array(items.iter().map(Value::from_json).collect()),
            J::Object(_) => Value::Json(json.clone()),
        }
    }

    /// Get a string representation for uniqueness tracking and id matching.
    pub fn to_unique_key(&self) -> String {
        match self {
            Value::Null => "__NULL__".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format!("{:.10}", f),
            Value::String(s) => s.to_string(),
            Value::Timestamp(ts) => ts.to_string(),
            Value::Date(d) => d.to_string(),
            Value::Uuid(u) => u.to_string(),
            Value::Json(j) => j.to_string(),
            Value::Bytes(b) => hex_encode(b),
            Value::Array(items) => items
                .iter()
                .map(Value::to_unique_key)
                .collect::<Vec<_>>()
                .join("|"),
        }
    }

    /// Value as it should appear in flattened (SQL mode) output: null becomes
    /// the literal `NULL` marker, numbers and booleans keep their type, text
    /// has single quotes doubled, composites are JSON text with quotes doubled.
    pub fn to_sql_safe(&self) -> Value {
        match self {
            Value::Null => Value::borrowed("NULL"),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => self.clone(),
            Value::String(s) => Value::owned(s.replace('\'', "''")),
            Value::Timestamp(ts) => Value::owned(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            Value::Date(d) => Value::owned(d.format("%Y-%m-%d").to_string()),
            Value::Uuid(u) => Value::owned(u.to_string()),
            Value::Bytes(b) => Value::owned(hex_encode(b)),
            Value::Json(_) | Value::Array(_) => {
                Value::owned(self.to_json().to_string().replace('\'', "''"))
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            Value::Date(d) => d.and_hms_opt(0, 0, 0),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(_) => serializer.serialize_unit(),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => items.serialize(serializer),
            Value::Json(j) => j.serialize(serializer),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Uuid(u) => write!(f, "{}", u),
            Value::Json(j) => write!(f, "{}", j),
            Value::Bytes(b) => write!(f, "{}", hex_encode(b)),
            Value::Array(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Value::borrowed(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::owned(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
