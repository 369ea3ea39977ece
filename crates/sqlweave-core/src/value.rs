use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A typed cell value in the object model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Whether this value is the NULL marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn discriminant(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::UInt(_) => 3,
            Value::Float(_) => 4,
            Value::Text(_) => 5,
            Value::Bytes(_) => 6,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Total order so values can be kept in BTreeSet uniqueness caches.
// Cross-type comparisons fall back to the discriminant.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::UInt(a), Value::UInt(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (a, b) => a.discriminant().cmp(&b.discriminant()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// A driver-native cell value, before dtype-directed interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

/// A driver-native row: column names paired with raw values, in the
/// order the driver produced them.
pub type RawRow = Vec<(String, RawValue)>;

/// An interpreted row keyed by column name.
pub type Row = BTreeMap<String, Value>;

/// Interpreted result of a query.
///
/// `None` is the explicit absent-value marker for statements that do
/// not return rows (insert, update, delete, schema mutations) so
/// callers can tell "no rows matched" apart from "not a row-returning
/// statement".
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    None,
    Rows(Vec<Row>),
    Count(u64),
    Names(Vec<String>),
}

impl Outcome {
    /// Rows of a select/distinct result, or an empty slice otherwise.
    pub fn rows(&self) -> &[Row] {
        match self {
            Outcome::Rows(rows) => rows,
            _ => &[],
        }
    }

    /// The scalar of a count result.
    pub fn count(&self) -> Option<u64> {
        match self {
            Outcome::Count(n) => Some(*n),
            _ => None,
        }
    }

    /// Names from a `show tables` or `describe` result.
    pub fn names(&self) -> &[String] {
        match self {
            Outcome::Names(names) => names,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn values_order_totally_in_sets() {
        let mut set = BTreeSet::new();
        set.insert(Value::Int(3));
        set.insert(Value::Float(1.5));
        set.insert(Value::Text("a".to_string()));
        set.insert(Value::Null);
        assert!(set.contains(&Value::Int(3)));
        assert!(!set.contains(&Value::Int(4)));
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn outcome_none_is_distinct_from_empty_rows() {
        assert_ne!(Outcome::None, Outcome::Rows(Vec::new()));
        assert!(Outcome::None.rows().is_empty());
    }
}
