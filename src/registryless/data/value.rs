//! Structured record values

use super::schema::Schema;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A value conforming to a structured [`Schema`]
///
/// Struct and map entries are kept in sorted maps so that equal records compare
/// equal regardless of insertion order; struct field order is carried by the schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldValue {
    /// Absent value of an optional schema
    Null,
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Array of values - all elements share the schema's value schema
    Array(Vec<FieldValue>),
    /// Map with string keys
    Map(BTreeMap<String, FieldValue>),
    /// Structured data with named fields
    Struct(BTreeMap<String, FieldValue>),
    /// Decimal logical type
    Decimal(Decimal),
    /// Date logical type
    Date(NaiveDate),
    /// Time-of-day logical type; encoding rejects sub-millisecond parts
    Time(NaiveTime),
    /// Timestamp logical type (UTC); encoding rejects sub-millisecond parts
    Timestamp(NaiveDateTime),
}

impl FieldValue {
    /// Build a struct value from `(field, value)` pairs
    pub fn structure<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        FieldValue::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a map value from `(key, value)` pairs
    pub fn map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        FieldValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Look up a struct field; `None` for non-struct values
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        match self {
            FieldValue::Struct(fields) => fields.get(field),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short type label used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "NULL",
            FieldValue::Boolean(_) => "BOOLEAN",
            FieldValue::Int8(_) => "INT8",
            FieldValue::Int16(_) => "INT16",
            FieldValue::Int32(_) => "INT32",
            FieldValue::Int64(_) => "INT64",
            FieldValue::Float32(_) => "FLOAT32",
            FieldValue::Float64(_) => "FLOAT64",
            FieldValue::String(_) => "STRING",
            FieldValue::Bytes(_) => "BYTES",
            FieldValue::Array(_) => "ARRAY",
            FieldValue::Map(_) => "MAP",
            FieldValue::Struct(_) => "STRUCT",
            FieldValue::Decimal(_) => "DECIMAL",
            FieldValue::Date(_) => "DATE",
            FieldValue::Time(_) => "TIME",
            FieldValue::Timestamp(_) => "TIMESTAMP",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Int8(i) => write!(f, "{}", i),
            FieldValue::Int16(i) => write!(f, "{}", i),
            FieldValue::Int32(i) => write!(f, "{}", i),
            FieldValue::Int64(i) => write!(f, "{}", i),
            FieldValue::Float32(v) => write!(f, "{}", v),
            FieldValue::Float64(v) => write!(f, "{}", v),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Date(d) => write!(f, "{}", d),
            FieldValue::Time(t) => write!(f, "{}", t),
            FieldValue::Timestamp(t) => write!(f, "{}", t),
            FieldValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            FieldValue::Map(entries) | FieldValue::Struct(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int32(i)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int64(i)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float64(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

/// A structured schema paired with a value that conforms to it
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaAndValue {
    pub schema: Schema,
    pub value: FieldValue,
}

impl SchemaAndValue {
    pub fn new(schema: Schema, value: FieldValue) -> Self {
        Self { schema, value }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }
}
