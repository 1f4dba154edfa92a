//! Dynamic row values.
//!
//! Tables render rows supplied by application data binders. Rows are not
//! statically typed: a row may be a positional slice, a keyed map, or an
//! application object exposing fields through the [`Record`] trait. [`Value`]
//! is the common currency between binders, columns, and item lists.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// An application object that exposes named fields to columns.
///
/// Implement this for domain types that should be rendered by key, node or
/// alias columns, or that should carry a row identity in a select table.
pub trait Record: Send + Sync + fmt::Debug {
    /// Look up a field by name.
    fn get(&self, key: &str) -> Option<Value>;

    /// Explicit row identity, consulted first when a select table needs a row ID.
    fn id(&self) -> Option<String> {
        None
    }

    /// Primary key, consulted when [`id`](Self::id) returns `None`.
    fn primary_key(&self) -> Option<Value> {
        None
    }

    /// Read a named alias value (a computed column of a query).
    fn alias(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }
}

/// A dynamically typed value held in a table row or list item.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Point in time, always stored in UTC.
    Time(DateTime<Utc>),
    /// Ordered sequence of values. A row slice, or a set of rows.
    List(Vec<Value>),
    /// Keyed values. A row map.
    Map(BTreeMap<String, Value>),
    /// Application object.
    Record(Arc<dyn Record>),
}

impl Value {
    /// Build a list value from anything convertible into values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a map value from key/value pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Wrap an application record.
    pub fn record(record: impl Record + 'static) -> Self {
        Self::Record(Arc::new(record))
    }

    /// Returns `true` if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Time(_) => "time",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }

    /// Try to get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            Value::String(s) => match s.as_str() {
                "true" | "1" | "on" => Some(true),
                "false" | "0" | "off" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Try to get the value as an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to get the value as a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Borrow the value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as a time.
    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Borrow the value as a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the value as a map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the value as a record.
    pub fn as_record(&self) -> Option<&Arc<dyn Record>> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Positional lookup into a list value.
    pub fn index(&self, index: usize) -> Option<&Value> {
        self.as_list().and_then(|items| items.get(index))
    }

    /// Keyed lookup into a map or record value.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.get(key).cloned(),
            Value::Record(r) => r.get(key),
            _ => None,
        }
    }

    /// Walk a chain of keys, descending through nested maps and records.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.get(first.as_ref())?;
        for key in rest {
            current = current.get(key.as_ref())?;
        }
        Some(current)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => match (a.id(), b.id()) {
                (Some(x), Some(y)) => x == y,
                _ => Arc::ptr_eq(a, b),
            },
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::Time(t) => write!(f, "{}", t.to_rfc3339()),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Value::Record(r) => match r.id() {
                Some(id) => f.write_str(&id),
                None => write!(f, "{:?}", r),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Person {
        id: u32,
        name: &'static str,
    }

    impl Record for Person {
        fn get(&self, key: &str) -> Option<Value> {
            match key {
                "name" => Some(self.name.into()),
                "address" => Some(Value::map([("city", "Lisbon")])),
                _ => None,
            }
        }

        fn primary_key(&self) -> Option<Value> {
            Some(self.id.into())
        }
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(42).as_i64(), Some(42));
        assert_eq!(Value::from("7").as_i64(), Some(7));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(2.5).as_f64(), Some(2.5));
        assert!(Value::from(None::<i64>).is_null());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(0.1).to_string(), "0.1");
        assert_eq!(Value::list([1, 2]).to_string(), "[1, 2]");
    }

    #[test]
    fn test_value_keyed_access() {
        let row = Value::record(Person { id: 3, name: "Ana" });
        assert_eq!(row.get("name"), Some(Value::from("Ana")));
        assert_eq!(
            row.get_path(&["address", "city"]),
            Some(Value::from("Lisbon"))
        );
        assert_eq!(row.get_path(&["address", "zip"]), None);
        assert_eq!(
            row.as_record().and_then(|r| r.primary_key()),
            Some(Value::Int(3))
        );
    }

    #[test]
    fn test_value_equality_across_numeric_types() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert_ne!(Value::from("2"), Value::Int(2));
    }
}
