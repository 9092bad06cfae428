//! JSON rendering of structured values
//!
//! Bytes are base64 encoded, decimals are strings to keep their scale, and
//! temporal values use ISO-8601 text. Parsing is guided by a structured schema
//! since JSON alone cannot tell an INT8 from an INT64 or a date from a string.

use crate::registryless::data::{FieldValue, LogicalType, Schema, SchemaType};
use crate::registryless::error::{ConverterError, ConverterResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::BTreeMap;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.3f";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Render a structured value as JSON
pub fn to_json(value: &FieldValue) -> JsonValue {
    match value {
        FieldValue::Null => JsonValue::Null,
        FieldValue::Boolean(b) => JsonValue::Bool(*b),
        FieldValue::Int8(i) => JsonValue::from(*i),
        FieldValue::Int16(i) => JsonValue::from(*i),
        FieldValue::Int32(i) => JsonValue::from(*i),
        FieldValue::Int64(i) => JsonValue::from(*i),
        FieldValue::Float32(f) => float(f64::from(*f)),
        FieldValue::Float64(f) => float(*f),
        FieldValue::String(s) => JsonValue::String(s.clone()),
        FieldValue::Bytes(b) => JsonValue::String(STANDARD.encode(b)),
        FieldValue::Decimal(d) => JsonValue::String(d.to_string()),
        FieldValue::Date(d) => JsonValue::String(d.format(DATE_FORMAT).to_string()),
        FieldValue::Time(t) => JsonValue::String(t.format(TIME_FORMAT).to_string()),
        FieldValue::Timestamp(ts) => JsonValue::String(ts.format(TIMESTAMP_FORMAT).to_string()),
        FieldValue::Array(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        FieldValue::Map(entries) | FieldValue::Struct(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect::<JsonMap<_, _>>(),
        ),
    }
}

fn float(value: f64) -> JsonValue {
    // JSON has no NaN or infinity
    serde_json::Number::from_f64(value)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

/// Parse JSON into a value conforming to `schema`
pub fn from_json(schema: &Schema, json: &JsonValue) -> ConverterResult<FieldValue> {
    parse(schema, json, "value")
}

fn invalid(schema: &Schema, json: &JsonValue, path: &str) -> ConverterError {
    ConverterError::translation(format!("{}: cannot read {} as {}", path, json, schema))
}

fn parse(schema: &Schema, json: &JsonValue, path: &str) -> ConverterResult<FieldValue> {
    if json.is_null() {
        if schema.is_optional() {
            return Ok(FieldValue::Null);
        }
        return schema.default_value().cloned().ok_or_else(|| {
            ConverterError::translation(format!("{}: {} is required", path, schema))
        });
    }

    if let Some(logical) = schema.logical_type() {
        let parsed = match logical {
            LogicalType::Decimal { .. } => match json {
                JsonValue::String(s) => Decimal::from_str(s).ok(),
                JsonValue::Number(n) => Decimal::from_str(&n.to_string()).ok(),
                _ => None,
            }
            .map(FieldValue::Decimal),
            LogicalType::Date => json
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
                .map(FieldValue::Date),
            LogicalType::Time => json
                .as_str()
                .and_then(|s| NaiveTime::parse_from_str(s, "%H:%M:%S%.f").ok())
                .map(FieldValue::Time),
            LogicalType::Timestamp => json
                .as_str()
                .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok())
                .map(FieldValue::Timestamp),
        };
        return parsed.ok_or_else(|| invalid(schema, json, path));
    }

    let parsed = match schema.schema_type() {
        SchemaType::Boolean => json.as_bool().map(FieldValue::Boolean),
        SchemaType::Int8 => json
            .as_i64()
            .and_then(|i| i8::try_from(i).ok())
            .map(FieldValue::Int8),
        SchemaType::Int16 => json
            .as_i64()
            .and_then(|i| i16::try_from(i).ok())
            .map(FieldValue::Int16),
        SchemaType::Int32 => json
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(FieldValue::Int32),
        SchemaType::Int64 => json.as_i64().map(FieldValue::Int64),
        SchemaType::Float32 => json.as_f64().map(|f| FieldValue::Float32(f as f32)),
        SchemaType::Float64 => json.as_f64().map(FieldValue::Float64),
        SchemaType::String => json.as_str().map(|s| FieldValue::String(s.to_string())),
        SchemaType::Bytes => json
            .as_str()
            .and_then(|s| STANDARD.decode(s).ok())
            .map(FieldValue::Bytes),
        SchemaType::Array => {
            let (Some(items), Some(item_schema)) = (json.as_array(), schema.value_schema()) else {
                return Err(invalid(schema, json, path));
            };
            let parsed = items
                .iter()
                .enumerate()
                .map(|(i, item)| parse(item_schema, item, &format!("{}[{}]", path, i)))
                .collect::<ConverterResult<Vec<_>>>()?;
            Some(FieldValue::Array(parsed))
        }
        SchemaType::Map => {
            let (Some(object), Some(value_schema)) = (json.as_object(), schema.value_schema())
            else {
                return Err(invalid(schema, json, path));
            };
            let mut entries = BTreeMap::new();
            for (key, entry) in object {
                entries.insert(
                    key.clone(),
                    parse(value_schema, entry, &format!("{}[{}]", path, key))?,
                );
            }
            Some(FieldValue::Map(entries))
        }
        SchemaType::Struct => {
            let Some(object) = json.as_object() else {
                return Err(invalid(schema, json, path));
            };
            if let Some(unknown) = object.keys().find(|name| schema.field(name).is_none()) {
                return Err(ConverterError::translation(format!(
                    "{}.{} is not a field of {}",
                    path, unknown, schema
                )));
            }
            let mut fields = BTreeMap::new();
            for field in schema.fields() {
                let field_json = object.get(field.name()).unwrap_or(&JsonValue::Null);
                let field_path = format!("{}.{}", path, field.name());
                fields.insert(
                    field.name().to_string(),
                    parse(field.schema(), field_json, &field_path)?,
                );
            }
            Some(FieldValue::Struct(fields))
        }
    };
    parsed.ok_or_else(|| invalid(schema, json, path))
}
