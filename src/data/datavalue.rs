use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// A single cell value in the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Null,
}

impl DataValue {
    /// Convert a JSON scalar into a cell value
    ///
    /// Arrays and objects are kept as their JSON text.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => DataValue::Null,
            JsonValue::Bool(b) => DataValue::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DataValue::Integer(i)
                } else {
                    DataValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => DataValue::Text(s.clone()),
            other => DataValue::Text(other.to_string()),
        }
    }

    /// Convert back to JSON, temporal values as ISO 8601 text
    pub fn to_json(&self) -> JsonValue {
        match self {
            DataValue::Integer(i) => JsonValue::from(*i),
            DataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DataValue::Text(s) => JsonValue::String(s.clone()),
            DataValue::Boolean(b) => JsonValue::Bool(*b),
            DataValue::Date(d) => JsonValue::String(d.to_string()),
            DataValue::Time(t) => JsonValue::String(t.to_string()),
            DataValue::DateTime(dt) => JsonValue::String(dt.to_string()),
            DataValue::Null => JsonValue::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Truthiness used by the `#blank` / `#non-blank` shortcuts and the
    /// expression filter: null, zero, empty text and `false` are falsy,
    /// temporal values are always truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            DataValue::Integer(i) => *i != 0,
            DataValue::Float(f) => *f != 0.0,
            DataValue::Text(s) => !s.is_empty(),
            DataValue::Boolean(b) => *b,
            DataValue::Date(_) | DataValue::Time(_) | DataValue::DateTime(_) => true,
            DataValue::Null => false,
        }
    }

    /// Scalars the expression filter compares in raw form
    pub fn is_basic(&self) -> bool {
        matches!(
            self,
            DataValue::Integer(_) | DataValue::Float(_) | DataValue::Text(_) | DataValue::Boolean(_)
        )
    }

    /// Short variant name for logs and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Integer(_) => "int",
            DataValue::Float(_) => "float",
            DataValue::Text(_) => "str",
            DataValue::Boolean(_) => "bool",
            DataValue::Date(_) => "date",
            DataValue::Time(_) => "time",
            DataValue::DateTime(_) => "datetime",
            DataValue::Null => "null",
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Text(s) => write!(f, "{}", s),
            DataValue::Boolean(b) => write!(f, "{}", b),
            DataValue::Date(d) => write!(f, "{}", d),
            DataValue::Time(t) => write!(f, "{}", t),
            DataValue::DateTime(dt) => write!(f, "{}", dt),
            DataValue::Null => write!(f, ""),
        }
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Integer(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Integer(value as i64)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::Text(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::Text(value)
    }
}

impl From<NaiveDate> for DataValue {
    fn from(value: NaiveDate) -> Self {
        DataValue::Date(value)
    }
}

impl From<NaiveTime> for DataValue {
    fn from(value: NaiveTime) -> Self {
        DataValue::Time(value)
    }
}

impl From<NaiveDateTime> for DataValue {
    fn from(value: NaiveDateTime) -> Self {
        DataValue::DateTime(value)
    }
}
