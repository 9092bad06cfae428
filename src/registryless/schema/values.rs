//! Value translation between structured records and Avro values
//!
//! Both directions are guided by the structured [`Schema`]: the Avro value
//! shapes produced here mirror exactly what the schema translator emits for
//! that schema (union branch order, record field order, logical types).

use crate::registryless::data::{
    DECIMAL_PRECISION_PARAM, FieldValue, LogicalType, Schema, SchemaType,
};
use crate::registryless::error::{ConverterError, ConverterResult};
use apache_avro::types::Value as AvroValue;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};

/// Days between 0001-01-01 (day 1 of the common era) and 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Precision given to decimals whose schema does not declare one
pub const DEFAULT_DECIMAL_PRECISION: usize = 64;

/// Largest scale a [`rust_decimal::Decimal`] can represent
const MAX_DECIMAL_SCALE: u32 = 28;

/// Convert a structured value into the Avro value for `schema`
pub fn to_avro_value(schema: &Schema, value: &FieldValue) -> ConverterResult<AvroValue> {
    to_avro(schema, value, "value")
}

/// Convert an Avro value back into a structured value conforming to `schema`
pub fn to_connect_value(schema: &Schema, value: &AvroValue) -> ConverterResult<FieldValue> {
    from_avro(schema, value, "value")
}

/// Union branch indexes `(null, value)` for an optional schema
///
/// A non-null default must match the first branch of an Avro union, so such
/// schemas put the value branch first.
pub(crate) fn optional_branches(schema: &Schema) -> (u32, u32) {
    match schema.default_value() {
        Some(default) if !default.is_null() => (1, 0),
        _ => (0, 1),
    }
}

/// Declared precision of a decimal schema
pub(crate) fn decimal_precision(schema: &Schema) -> usize {
    schema
        .parameter(DECIMAL_PRECISION_PARAM)
        .and_then(|p| p.parse::<usize>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(DEFAULT_DECIMAL_PRECISION)
}

fn mismatch(schema: &Schema, value: &FieldValue, path: &str) -> ConverterError {
    ConverterError::translation(format!(
        "{} expected {} but got {}",
        path,
        schema,
        value.type_name()
    ))
}

fn avro_mismatch(schema: &Schema, value: &AvroValue, path: &str) -> ConverterError {
    ConverterError::translation(format!(
        "{} expected {} but Avro value was {:?}",
        path, schema, value
    ))
}

fn to_avro(schema: &Schema, value: &FieldValue, path: &str) -> ConverterResult<AvroValue> {
    if schema.is_optional() {
        let (null_branch, value_branch) = optional_branches(schema);
        return match value {
            FieldValue::Null => Ok(AvroValue::Union(null_branch, Box::new(AvroValue::Null))),
            present => Ok(AvroValue::Union(
                value_branch,
                Box::new(required_to_avro(schema, present, path)?),
            )),
        };
    }

    match value {
        FieldValue::Null => match schema.default_value() {
            Some(default) if !default.is_null() => required_to_avro(schema, default, path),
            _ => Err(ConverterError::translation(format!(
                "{} is required by {} but was null",
                path, schema
            ))),
        },
        present => required_to_avro(schema, present, path),
    }
}

fn required_to_avro(schema: &Schema, value: &FieldValue, path: &str) -> ConverterResult<AvroValue> {
    if let Some(logical) = schema.logical_type() {
        return match (logical, value) {
            (LogicalType::Decimal { scale }, FieldValue::Decimal(d)) => {
                let bytes = decimal_to_bytes(d, scale, decimal_precision(schema))
                    .map_err(|e| ConverterError::translation(format!("{}: {}", path, e)))?;
                Ok(AvroValue::Decimal(apache_avro::Decimal::from(bytes)))
            }
            (LogicalType::Date, FieldValue::Date(d)) => Ok(AvroValue::Date(date_to_days(d))),
            (LogicalType::Time, FieldValue::Time(t)) => time_to_millis(t)
                .map(AvroValue::TimeMillis)
                .map_err(|e| ConverterError::translation(format!("{}: {}", path, e))),
            (LogicalType::Timestamp, FieldValue::Timestamp(ts)) => timestamp_to_millis(ts)
                .map(AvroValue::TimestampMillis)
                .map_err(|e| ConverterError::translation(format!("{}: {}", path, e))),
            _ => Err(mismatch(schema, value, path)),
        };
    }

    match (schema.schema_type(), value) {
        (SchemaType::Boolean, FieldValue::Boolean(b)) => Ok(AvroValue::Boolean(*b)),
        (SchemaType::Int8, FieldValue::Int8(i)) => Ok(AvroValue::Int(i32::from(*i))),
        (SchemaType::Int16, FieldValue::Int16(i)) => Ok(AvroValue::Int(i32::from(*i))),
        (SchemaType::Int32, FieldValue::Int32(i)) => Ok(AvroValue::Int(*i)),
        (SchemaType::Int64, FieldValue::Int64(i)) => Ok(AvroValue::Long(*i)),
        (SchemaType::Float32, FieldValue::Float32(f)) => Ok(AvroValue::Float(*f)),
        (SchemaType::Float64, FieldValue::Float64(f)) => Ok(AvroValue::Double(*f)),
        (SchemaType::String, FieldValue::String(s)) => Ok(AvroValue::String(s.clone())),
        (SchemaType::Bytes, FieldValue::Bytes(b)) => Ok(AvroValue::Bytes(b.clone())),
        (SchemaType::Array, FieldValue::Array(items)) => {
            let item_schema = element_schema(schema, path)?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| to_avro(item_schema, item, &format!("{}[{}]", path, i)))
                .collect::<ConverterResult<Vec<_>>>()
                .map(AvroValue::Array)
        }
        (SchemaType::Map, FieldValue::Map(entries)) => {
            require_string_keys(schema, path)?;
            let value_schema = element_schema(schema, path)?;
            let mut avro_map = HashMap::with_capacity(entries.len());
            for (key, entry) in entries {
                let converted = to_avro(value_schema, entry, &format!("{}[{}]", path, key))?;
                avro_map.insert(key.clone(), converted);
            }
            Ok(AvroValue::Map(avro_map))
        }
        (SchemaType::Struct, FieldValue::Struct(fields)) => {
            if let Some(unknown) = fields.keys().find(|name| schema.field(name).is_none()) {
                return Err(ConverterError::translation(format!(
                    "{}.{} is not a field of {}",
                    path, unknown, schema
                )));
            }
            let mut record = Vec::with_capacity(schema.fields().len());
            for field in schema.fields() {
                let field_value = fields.get(field.name()).unwrap_or(&FieldValue::Null);
                let converted =
                    to_avro(field.schema(), field_value, &format!("{}.{}", path, field.name()))?;
                record.push((field.name().to_string(), converted));
            }
            Ok(AvroValue::Record(record))
        }
        _ => Err(mismatch(schema, value, path)),
    }
}

fn from_avro(schema: &Schema, value: &AvroValue, path: &str) -> ConverterResult<FieldValue> {
    let value = match value {
        AvroValue::Union(_, inner) => inner.as_ref(),
        other => other,
    };

    if let AvroValue::Null = value {
        if schema.is_optional() {
            return Ok(FieldValue::Null);
        }
        return match schema.default_value() {
            Some(default) => Ok(default.clone()),
            None => Err(ConverterError::translation(format!(
                "{} is required by {} but Avro value was null",
                path, schema
            ))),
        };
    }

    if let Some(logical) = schema.logical_type() {
        return match (logical, value) {
            (LogicalType::Decimal { scale }, AvroValue::Decimal(decimal)) => {
                let bytes: Vec<u8> = decimal.try_into().map_err(|e| {
                    ConverterError::translation(format!(
                        "{}: failed to read decimal bytes: {:?}",
                        path, e
                    ))
                })?;
                decimal_from_bytes(&bytes, scale)
                    .map(FieldValue::Decimal)
                    .map_err(|e| ConverterError::translation(format!("{}: {}", path, e)))
            }
            (LogicalType::Decimal { scale }, AvroValue::Bytes(bytes))
            | (LogicalType::Decimal { scale }, AvroValue::Fixed(_, bytes)) => {
                decimal_from_bytes(bytes, scale)
                    .map(FieldValue::Decimal)
                    .map_err(|e| ConverterError::translation(format!("{}: {}", path, e)))
            }
            (LogicalType::Date, AvroValue::Date(days)) | (LogicalType::Date, AvroValue::Int(days)) => {
                days_to_date(*days).map(FieldValue::Date).ok_or_else(|| {
                    ConverterError::translation(format!("{}: date {} out of range", path, days))
                })
            }
            (LogicalType::Time, AvroValue::TimeMillis(millis))
            | (LogicalType::Time, AvroValue::Int(millis)) => {
                millis_to_time(*millis).map(FieldValue::Time).ok_or_else(|| {
                    ConverterError::translation(format!("{}: time {} out of range", path, millis))
                })
            }
            (LogicalType::Timestamp, AvroValue::TimestampMillis(millis))
            | (LogicalType::Timestamp, AvroValue::Long(millis)) => millis_to_timestamp(*millis)
                .map(FieldValue::Timestamp)
                .ok_or_else(|| {
                    ConverterError::translation(format!(
                        "{}: timestamp {} out of range",
                        path, millis
                    ))
                }),
            _ => Err(avro_mismatch(schema, value, path)),
        };
    }

    match (schema.schema_type(), value) {
        (SchemaType::Boolean, AvroValue::Boolean(b)) => Ok(FieldValue::Boolean(*b)),
        (SchemaType::Int8, AvroValue::Int(i)) => i8::try_from(*i)
            .map(FieldValue::Int8)
            .map_err(|_| ConverterError::translation(format!("{}: {} overflows INT8", path, i))),
        (SchemaType::Int16, AvroValue::Int(i)) => i16::try_from(*i)
            .map(FieldValue::Int16)
            .map_err(|_| ConverterError::translation(format!("{}: {} overflows INT16", path, i))),
        (SchemaType::Int32, AvroValue::Int(i)) => Ok(FieldValue::Int32(*i)),
        (SchemaType::Int64, AvroValue::Long(l))
        | (SchemaType::Int64, AvroValue::TimeMicros(l))
        | (SchemaType::Int64, AvroValue::TimestampMicros(l)) => Ok(FieldValue::Int64(*l)),
        (SchemaType::Float32, AvroValue::Float(f)) => Ok(FieldValue::Float32(*f)),
        (SchemaType::Float64, AvroValue::Double(d)) => Ok(FieldValue::Float64(*d)),
        (SchemaType::String, AvroValue::String(s)) | (SchemaType::String, AvroValue::Enum(_, s)) => {
            Ok(FieldValue::String(s.clone()))
        }
        (SchemaType::String, AvroValue::Uuid(uuid)) => Ok(FieldValue::String(uuid.to_string())),
        (SchemaType::Bytes, AvroValue::Bytes(b)) | (SchemaType::Bytes, AvroValue::Fixed(_, b)) => {
            Ok(FieldValue::Bytes(b.clone()))
        }
        (SchemaType::Array, AvroValue::Array(items)) => {
            let item_schema = element_schema(schema, path)?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| from_avro(item_schema, item, &format!("{}[{}]", path, i)))
                .collect::<ConverterResult<Vec<_>>>()
                .map(FieldValue::Array)
        }
        (SchemaType::Map, AvroValue::Map(entries)) => {
            let value_schema = element_schema(schema, path)?;
            let mut map = BTreeMap::new();
            for (key, entry) in entries {
                let converted = from_avro(value_schema, entry, &format!("{}[{}]", path, key))?;
                map.insert(key.clone(), converted);
            }
            Ok(FieldValue::Map(map))
        }
        (SchemaType::Struct, AvroValue::Record(record)) => {
            let mut fields = BTreeMap::new();
            for (name, field_value) in record {
                let field = schema.field(name).ok_or_else(|| {
                    ConverterError::translation(format!(
                        "{}.{} is not a field of {}",
                        path, name, schema
                    ))
                })?;
                let converted = from_avro(field.schema(), field_value, &format!("{}.{}", path, name))?;
                fields.insert(name.clone(), converted);
            }
            for field in schema.fields() {
                if !fields.contains_key(field.name()) {
                    let missing = from_avro(
                        field.schema(),
                        &AvroValue::Null,
                        &format!("{}.{}", path, field.name()),
                    )?;
                    fields.insert(field.name().to_string(), missing);
                }
            }
            Ok(FieldValue::Struct(fields))
        }
        _ => Err(avro_mismatch(schema, value, path)),
    }
}

fn element_schema<'a>(schema: &'a Schema, path: &str) -> ConverterResult<&'a Schema> {
    schema.value_schema().ok_or_else(|| {
        ConverterError::translation(format!("{}: {} has no element schema", path, schema))
    })
}

pub(crate) fn require_string_keys(schema: &Schema, path: &str) -> ConverterResult<()> {
    match schema.key_schema() {
        Some(key) if key.schema_type() == SchemaType::String && !key.is_optional() => Ok(()),
        Some(key) => Err(ConverterError::translation(format!(
            "{}: Avro maps require STRING keys, found {}",
            path, key
        ))),
        None => Err(ConverterError::translation(format!(
            "{}: {} has no key schema",
            path, schema
        ))),
    }
}

/// Highest decimal precision representable in `len` two's-complement bytes
fn max_precision_for_len(len: usize) -> usize {
    let bits = (8 * len as i32) - 1;
    (2.0_f64.powi(bits) - 1.0).log10().floor() as usize
}

/// Smallest byte width whose range covers `precision` decimal digits
fn bytes_for_precision(precision: usize) -> usize {
    (1..).find(|len| max_precision_for_len(*len) >= precision).unwrap_or(16)
}

/// Encode a decimal as big-endian two's complement of its unscaled value
///
/// The output is sign-extended to the width implied by `precision`, which is
/// what Avro schema resolution expects of a decimal with that precision.
pub(crate) fn decimal_to_bytes(
    decimal: &Decimal,
    scale: u32,
    precision: usize,
) -> Result<Vec<u8>, String> {
    if scale > MAX_DECIMAL_SCALE {
        return Err(format!(
            "decimal scale {} exceeds supported maximum {}",
            scale, MAX_DECIMAL_SCALE
        ));
    }
    if decimal.scale() > scale {
        return Err(format!(
            "decimal {} has scale {} but the schema allows {}",
            decimal,
            decimal.scale(),
            scale
        ));
    }

    let mut rescaled = *decimal;
    rescaled.rescale(scale);
    let unscaled = rescaled.mantissa();

    let digits = unscaled.unsigned_abs().checked_ilog10().map_or(1, |d| d as usize + 1);
    if digits > precision {
        return Err(format!(
            "decimal {} has {} digits but the schema allows precision {}",
            rescaled, digits, precision
        ));
    }

    let mut bytes = unscaled.to_be_bytes().to_vec();
    // Trim redundant sign bytes, keeping at least one and the sign bit
    if unscaled >= 0 {
        while bytes.len() > 1 && bytes[0] == 0 && (bytes[1] & 0x80) == 0 {
            bytes.remove(0);
        }
    } else {
        while bytes.len() > 1 && bytes[0] == 0xFF && (bytes[1] & 0x80) != 0 {
            bytes.remove(0);
        }
    }

    let width = bytes_for_precision(precision);
    if bytes.len() < width {
        let fill = if unscaled < 0 { 0xFF } else { 0x00 };
        let mut padded = vec![fill; width - bytes.len()];
        padded.extend_from_slice(&bytes);
        bytes = padded;
    }
    Ok(bytes)
}

/// Decode a big-endian two's complement unscaled value into a decimal
pub(crate) fn decimal_from_bytes(bytes: &[u8], scale: u32) -> Result<Decimal, String> {
    if bytes.is_empty() {
        return Decimal::try_from_i128_with_scale(0, scale).map_err(|e| e.to_string());
    }

    let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    // Strip sign extension beyond what an i128 holds
    let significant = if bytes.len() > 16 {
        let (extension, rest) = bytes.split_at(bytes.len() - 16);
        let rest_sign = if rest[0] & 0x80 != 0 { 0xFF } else { 0x00 };
        if extension.iter().any(|b| *b != fill) || rest_sign != fill {
            return Err(format!("decimal of {} bytes overflows 128 bits", bytes.len()));
        }
        rest
    } else {
        bytes
    };

    let mut buf = [fill; 16];
    buf[16 - significant.len()..].copy_from_slice(significant);
    let unscaled = i128::from_be_bytes(buf);
    Decimal::try_from_i128_with_scale(unscaled, scale).map_err(|e| e.to_string())
}

pub(crate) fn date_to_days(date: &NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub(crate) fn days_to_date(days: i32) -> Option<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

/// Reject sub-millisecond parts and leap seconds, which Avro millis cannot carry
fn whole_millis(nanos: u32, what: impl std::fmt::Display) -> Result<u32, String> {
    if nanos >= 1_000_000_000 {
        return Err(format!("{} falls in a leap second", what));
    }
    if nanos % 1_000_000 != 0 {
        return Err(format!("{} has sub-millisecond precision", what));
    }
    Ok(nanos / 1_000_000)
}

pub(crate) fn time_to_millis(time: &NaiveTime) -> Result<i32, String> {
    let millis = whole_millis(time.nanosecond(), time)?;
    Ok((time.num_seconds_from_midnight() * 1000 + millis) as i32)
}

pub(crate) fn timestamp_to_millis(ts: &NaiveDateTime) -> Result<i64, String> {
    whole_millis(ts.nanosecond(), ts)?;
    Ok(ts.and_utc().timestamp_millis())
}

pub(crate) fn millis_to_time(millis: i32) -> Option<NaiveTime> {
    let millis = u32::try_from(millis).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(millis / 1000, (millis % 1000) * 1_000_000)
}

pub(crate) fn millis_to_timestamp(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

fn bytes_to_json(bytes: &[u8]) -> JsonValue {
    JsonValue::String(bytes.iter().map(|b| char::from(*b)).collect())
}

fn json_to_bytes(json: &JsonValue) -> Option<Vec<u8>> {
    json.as_str()?
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect()
}

fn invalid_default(schema: &Schema, detail: impl std::fmt::Display) -> ConverterError {
    ConverterError::translation(format!("invalid default for {}: {}", schema, detail))
}

/// Encode a structured default value as an Avro schema default
pub(crate) fn default_to_json(schema: &Schema, value: &FieldValue) -> ConverterResult<JsonValue> {
    if let Some(logical) = schema.logical_type() {
        return match (logical, value) {
            (_, FieldValue::Null) => Ok(JsonValue::Null),
            (LogicalType::Decimal { scale }, FieldValue::Decimal(d)) => {
                decimal_to_bytes(d, scale, decimal_precision(schema))
                    .map(|bytes| bytes_to_json(&bytes))
                    .map_err(|e| invalid_default(schema, e))
            }
            (LogicalType::Date, FieldValue::Date(d)) => Ok(JsonValue::from(date_to_days(d))),
            (LogicalType::Time, FieldValue::Time(t)) => time_to_millis(t)
                .map(JsonValue::from)
                .map_err(|e| invalid_default(schema, e)),
            (LogicalType::Timestamp, FieldValue::Timestamp(ts)) => timestamp_to_millis(ts)
                .map(JsonValue::from)
                .map_err(|e| invalid_default(schema, e)),
            _ => Err(invalid_default(schema, value.type_name())),
        };
    }

    match (schema.schema_type(), value) {
        (_, FieldValue::Null) => Ok(JsonValue::Null),
        (SchemaType::Boolean, FieldValue::Boolean(b)) => Ok(JsonValue::Bool(*b)),
        (SchemaType::Int8, FieldValue::Int8(i)) => Ok(JsonValue::from(*i)),
        (SchemaType::Int16, FieldValue::Int16(i)) => Ok(JsonValue::from(*i)),
        (SchemaType::Int32, FieldValue::Int32(i)) => Ok(JsonValue::from(*i)),
        (SchemaType::Int64, FieldValue::Int64(i)) => Ok(JsonValue::from(*i)),
        (SchemaType::Float32, FieldValue::Float32(f)) => float_json(schema, f64::from(*f)),
        (SchemaType::Float64, FieldValue::Float64(f)) => float_json(schema, *f),
        (SchemaType::String, FieldValue::String(s)) => Ok(JsonValue::String(s.clone())),
        (SchemaType::Bytes, FieldValue::Bytes(b)) => Ok(bytes_to_json(b)),
        (SchemaType::Array, FieldValue::Array(items)) => {
            let item_schema = element_schema(schema, "default")?;
            items
                .iter()
                .map(|item| default_to_json(item_schema, item))
                .collect::<ConverterResult<Vec<_>>>()
                .map(JsonValue::Array)
        }
        (SchemaType::Map, FieldValue::Map(entries)) => {
            let value_schema = element_schema(schema, "default")?;
            let mut object = JsonMap::new();
            for (key, entry) in entries {
                object.insert(key.clone(), default_to_json(value_schema, entry)?);
            }
            Ok(JsonValue::Object(object))
        }
        (SchemaType::Struct, FieldValue::Struct(fields)) => {
            let mut object = JsonMap::new();
            for field in schema.fields() {
                let field_value = fields.get(field.name()).unwrap_or(&FieldValue::Null);
                object.insert(
                    field.name().to_string(),
                    default_to_json(field.schema(), field_value)?,
                );
            }
            Ok(JsonValue::Object(object))
        }
        _ => Err(invalid_default(schema, value.type_name())),
    }
}

fn float_json(schema: &Schema, value: f64) -> ConverterResult<JsonValue> {
    serde_json::Number::from_f64(value)
        .map(JsonValue::Number)
        .ok_or_else(|| invalid_default(schema, value))
}

/// Decode an Avro schema default into a structured value
pub(crate) fn default_from_json(schema: &Schema, json: &JsonValue) -> ConverterResult<FieldValue> {
    if json.is_null() {
        return Ok(FieldValue::Null);
    }

    if let Some(logical) = schema.logical_type() {
        let converted = match logical {
            LogicalType::Decimal { scale } => json_to_bytes(json)
                .and_then(|bytes| decimal_from_bytes(&bytes, scale).ok())
                .map(FieldValue::Decimal),
            LogicalType::Date => json
                .as_i64()
                .and_then(|d| i32::try_from(d).ok())
                .and_then(days_to_date)
                .map(FieldValue::Date),
            LogicalType::Time => json
                .as_i64()
                .and_then(|t| i32::try_from(t).ok())
                .and_then(millis_to_time)
                .map(FieldValue::Time),
            LogicalType::Timestamp => json
                .as_i64()
                .and_then(millis_to_timestamp)
                .map(FieldValue::Timestamp),
        };
        return converted.ok_or_else(|| invalid_default(schema, json));
    }

    let converted = match schema.schema_type() {
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
        SchemaType::Bytes => json_to_bytes(json).map(FieldValue::Bytes),
        SchemaType::Array => {
            let item_schema = element_schema(schema, "default")?;
            match json.as_array() {
                Some(items) => Some(FieldValue::Array(
                    items
                        .iter()
                        .map(|item| default_from_json(item_schema, item))
                        .collect::<ConverterResult<Vec<_>>>()?,
                )),
                None => None,
            }
        }
        SchemaType::Map => {
            let value_schema = element_schema(schema, "default")?;
            match json.as_object() {
                Some(object) => {
                    let mut map = BTreeMap::new();
                    for (key, entry) in object {
                        map.insert(key.clone(), default_from_json(value_schema, entry)?);
                    }
                    Some(FieldValue::Map(map))
                }
                None => None,
            }
        }
        SchemaType::Struct => match json.as_object() {
            Some(object) => {
                let mut fields = BTreeMap::new();
                for field in schema.fields() {
                    let value = match object.get(field.name()) {
                        Some(entry) => default_from_json(field.schema(), entry)?,
                        None => field.schema().default_value().cloned().unwrap_or(FieldValue::Null),
                    };
                    fields.insert(field.name().to_string(), value);
                }
                Some(FieldValue::Struct(fields))
            }
            None => None,
        },
    };
    converted.ok_or_else(|| invalid_default(schema, json))
}
