//! Structured record schemas
//!
//! The host pipeline's own type system: a small set of primitive types plus
//! arrays, string-keyed maps and structs, each optionally nullable. Schemas are
//! immutable once built; use [`SchemaBuilder`] to construct them.

use super::logical::LogicalType;
use super::value::FieldValue;
use crate::registryless::error::{ConverterError, ConverterResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Structured schema types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SchemaType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Boolean,
    String,
    Bytes,
    Array,
    Map,
    Struct,
}

impl SchemaType {
    pub fn name(&self) -> &'static str {
        match self {
            SchemaType::Int8 => "INT8",
            SchemaType::Int16 => "INT16",
            SchemaType::Int32 => "INT32",
            SchemaType::Int64 => "INT64",
            SchemaType::Float32 => "FLOAT32",
            SchemaType::Float64 => "FLOAT64",
            SchemaType::Boolean => "BOOLEAN",
            SchemaType::String => "STRING",
            SchemaType::Bytes => "BYTES",
            SchemaType::Array => "ARRAY",
            SchemaType::Map => "MAP",
            SchemaType::Struct => "STRUCT",
        }
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, SchemaType::Array | SchemaType::Map | SchemaType::Struct)
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named field of a struct schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    name: String,
    index: usize,
    schema: Schema,
}

impl Field {
    pub fn new(name: impl Into<String>, index: usize, schema: Schema) -> Self {
        Self {
            name: name.into(),
            index,
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// Structured schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    schema_type: SchemaType,
    optional: bool,
    name: Option<String>,
    version: Option<i32>,
    doc: Option<String>,
    default_value: Option<FieldValue>,
    parameters: BTreeMap<String, String>,
    fields: Vec<Field>,
    key_schema: Option<Box<Schema>>,
    value_schema: Option<Box<Schema>>,
    /// Canonical JSON of everything above, computed once by `build`
    #[serde(skip)]
    fingerprint: Arc<str>,
}

impl Schema {
    pub fn boolean() -> Schema {
        SchemaBuilder::new(SchemaType::Boolean).build()
    }

    pub fn int8() -> Schema {
        SchemaBuilder::new(SchemaType::Int8).build()
    }

    pub fn int16() -> Schema {
        SchemaBuilder::new(SchemaType::Int16).build()
    }

    pub fn int32() -> Schema {
        SchemaBuilder::new(SchemaType::Int32).build()
    }

    pub fn int64() -> Schema {
        SchemaBuilder::new(SchemaType::Int64).build()
    }

    pub fn float32() -> Schema {
        SchemaBuilder::new(SchemaType::Float32).build()
    }

    pub fn float64() -> Schema {
        SchemaBuilder::new(SchemaType::Float64).build()
    }

    pub fn string() -> Schema {
        SchemaBuilder::new(SchemaType::String).build()
    }

    pub fn bytes() -> Schema {
        SchemaBuilder::new(SchemaType::Bytes).build()
    }

    pub fn optional_string() -> Schema {
        SchemaBuilder::new(SchemaType::String).optional().build()
    }

    pub fn schema_type(&self) -> SchemaType {
        self.schema_type
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version(&self) -> Option<i32> {
        self.version
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn default_value(&self) -> Option<&FieldValue> {
        self.default_value.as_ref()
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// Struct fields in declaration order; empty for non-struct schemas
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Key schema of a map
    pub fn key_schema(&self) -> Option<&Schema> {
        self.key_schema.as_deref()
    }

    /// Element schema of an array, or value schema of a map
    pub fn value_schema(&self) -> Option<&Schema> {
        self.value_schema.as_deref()
    }

    /// Logical type carried by this schema's name, if any
    pub fn logical_type(&self) -> Option<LogicalType> {
        LogicalType::of(self)
    }

    /// Canonical identity used to key translation caches
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Shared handle to the fingerprint, cheap to clone into a cache key
    pub(crate) fn cache_key(&self) -> Arc<str> {
        Arc::clone(&self.fingerprint)
    }

    /// Derive a schema from a value's own structure
    ///
    /// Used when no schema accompanies a record. Struct fields are inferred in
    /// name order; nulls and empty collections carry no type information and
    /// cannot be inferred.
    pub fn infer(value: &FieldValue) -> ConverterResult<Schema> {
        let schema = match value {
            FieldValue::Null => {
                return Err(ConverterError::translation(
                    "cannot infer a schema from a null value",
                ));
            }
            FieldValue::Boolean(_) => Schema::boolean(),
            FieldValue::Int8(_) => Schema::int8(),
            FieldValue::Int16(_) => Schema::int16(),
            FieldValue::Int32(_) => Schema::int32(),
            FieldValue::Int64(_) => Schema::int64(),
            FieldValue::Float32(_) => Schema::float32(),
            FieldValue::Float64(_) => Schema::float64(),
            FieldValue::String(_) => Schema::string(),
            FieldValue::Bytes(_) => Schema::bytes(),
            FieldValue::Decimal(d) => LogicalType::decimal(d.scale()).build(),
            FieldValue::Date(_) => LogicalType::date().build(),
            FieldValue::Time(_) => LogicalType::time().build(),
            FieldValue::Timestamp(_) => LogicalType::timestamp().build(),
            FieldValue::Array(items) => {
                let first = items.first().ok_or_else(|| {
                    ConverterError::translation("cannot infer element type of an empty array")
                })?;
                SchemaBuilder::array(Schema::infer(first)?).build()
            }
            FieldValue::Map(entries) => {
                let first = entries.values().next().ok_or_else(|| {
                    ConverterError::translation("cannot infer value type of an empty map")
                })?;
                SchemaBuilder::map(Schema::string(), Schema::infer(first)?).build()
            }
            FieldValue::Struct(fields) => {
                let mut builder = SchemaBuilder::structure();
                for (name, field_value) in fields {
                    let field_schema = Schema::infer(field_value).map_err(|e| {
                        ConverterError::translation(format!("field '{}': {}", name, e))
                    })?;
                    builder = builder.field(name.clone(), field_schema);
                }
                builder.build()
            }
        };
        Ok(schema)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}({})", self.schema_type, name)?,
            None => write!(f, "{}", self.schema_type)?,
        }
        if self.optional {
            write!(f, "?")?;
        }
        Ok(())
    }
}

/// Builder for [`Schema`]
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl From<Schema> for SchemaBuilder {
    fn from(schema: Schema) -> Self {
        Self { schema }
    }
}

impl SchemaBuilder {
    pub fn new(schema_type: SchemaType) -> Self {
        Self {
            schema: Schema {
                schema_type,
                optional: false,
                name: None,
                version: None,
                doc: None,
                default_value: None,
                parameters: BTreeMap::new(),
                fields: Vec::new(),
                key_schema: None,
                value_schema: None,
                fingerprint: Arc::from(""),
            },
        }
    }

    pub fn structure() -> Self {
        Self::new(SchemaType::Struct)
    }

    pub fn array(value_schema: Schema) -> Self {
        let mut builder = Self::new(SchemaType::Array);
        builder.schema.value_schema = Some(Box::new(value_schema));
        builder
    }

    pub fn map(key_schema: Schema, value_schema: Schema) -> Self {
        let mut builder = Self::new(SchemaType::Map);
        builder.schema.key_schema = Some(Box::new(key_schema));
        builder.schema.value_schema = Some(Box::new(value_schema));
        builder
    }

    pub fn optional(mut self) -> Self {
        self.schema.optional = true;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.schema.name = Some(name.into());
        self
    }

    pub fn version(mut self, version: i32) -> Self {
        self.schema.version = Some(version);
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.schema.doc = Some(doc.into());
        self
    }

    pub fn default_value(mut self, value: FieldValue) -> Self {
        self.schema.default_value = Some(value);
        self
    }

    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.schema.parameters.insert(key.into(), value.into());
        self
    }

    /// Append a struct field; a field with the same name is replaced in place
    pub fn field(mut self, name: impl Into<String>, schema: Schema) -> Self {
        let name = name.into();
        if let Some(existing) = self.schema.fields.iter_mut().find(|f| f.name == name) {
            existing.schema = schema;
        } else {
            let index = self.schema.fields.len();
            self.schema.fields.push(Field::new(name, index, schema));
        }
        self
    }

    pub fn schema_type(&self) -> SchemaType {
        self.schema.schema_type
    }

    pub fn has_name(&self) -> bool {
        self.schema.name.is_some()
    }

    pub fn has_doc(&self) -> bool {
        self.schema.doc.is_some()
    }

    pub fn build(self) -> Schema {
        let mut schema = self.schema;
        // Every map in the schema is ordered, so serialization is deterministic.
        let canonical =
            serde_json::to_string(&schema).unwrap_or_else(|_| format!("{:?}", schema));
        schema.fingerprint = Arc::from(canonical);
        schema
    }
}
