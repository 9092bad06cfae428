//! Structured ⇄ Avro schema translation
//!
//! Avro schemas are generated as JSON and parsed by `apache-avro`, which keeps
//! custom properties on records, fields, arrays and maps but not on primitive
//! types. Metadata describing a primitive schema (`connect.type` and friends)
//! is therefore stored on the nearest enclosing schema that keeps properties:
//! the record field, or the `connect.items` / `connect.values` property of an
//! array or map.

use super::cache::{DEFAULT_CACHE_SIZE, TranslationCache};
use super::values::{
    DEFAULT_DECIMAL_PRECISION, decimal_precision, default_from_json, default_to_json,
    optional_branches, require_string_keys, to_avro_value, to_connect_value,
};
use crate::registryless::data::{
    DECIMAL_PRECISION_PARAM, FieldValue, LogicalType, Schema, SchemaAndValue, SchemaBuilder,
    SchemaType,
};
use crate::registryless::error::{ConverterError, ConverterResult};
use apache_avro::Schema as AvroSchema;
use apache_avro::schema::{ArraySchema, DecimalSchema, MapSchema, RecordSchema, SchemaKind};
use apache_avro::types::Value as AvroValue;
use serde_json::{Map as JsonMap, Value as JsonValue, json};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Record name given to structs that have none
pub const DEFAULT_SCHEMA_NAME: &str = "ConnectDefault";
/// Namespace of generated default record names
pub const DEFAULT_NAMESPACE: &str = "io.registryless.avro";

pub const CONNECT_NAME_PROP: &str = "connect.name";
pub const CONNECT_VERSION_PROP: &str = "connect.version";
pub const CONNECT_DOC_PROP: &str = "connect.doc";
pub const CONNECT_PARAMETERS_PROP: &str = "connect.parameters";
pub const CONNECT_TYPE_PROP: &str = "connect.type";
/// Metadata of an array's element schema
pub const CONNECT_ITEMS_PROP: &str = "connect.items";
/// Metadata of a map's value schema
pub const CONNECT_VALUES_PROP: &str = "connect.values";

type Attributes = BTreeMap<String, JsonValue>;

/// Bidirectional schema and value translator with bounded caches
///
/// Each direction has its own cache; both are safe to use from several
/// threads through a shared reference.
#[derive(Debug)]
pub struct SchemaTranslator {
    to_avro_cache: TranslationCache<Arc<str>, AvroSchema>,
    to_connect_cache: TranslationCache<String, Schema>,
    connect_meta_data: bool,
}

impl Default for SchemaTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE, true)
    }
}

impl SchemaTranslator {
    pub fn new(cache_size: usize, connect_meta_data: bool) -> Self {
        Self {
            to_avro_cache: TranslationCache::new(cache_size),
            to_connect_cache: TranslationCache::new(cache_size),
            connect_meta_data,
        }
    }

    /// Cache of structured → Avro translations
    pub fn binary_cache(&self) -> &TranslationCache<Arc<str>, AvroSchema> {
        &self.to_avro_cache
    }

    /// Cache of Avro → structured translations
    pub fn structured_cache(&self) -> &TranslationCache<String, Schema> {
        &self.to_connect_cache
    }

    /// Translate a structured schema into an Avro schema
    pub fn to_binary_schema(&self, schema: &Schema) -> ConverterResult<AvroSchema> {
        self.to_avro_cache
            .get_or_try_insert(schema.cache_key(), || {
                log::debug!("Translating structured schema {} to Avro", schema);
                let mut ctx = ToAvroContext::default();
                let (avro_json, _) = self.avro_type(schema, &mut ctx)?;
                AvroSchema::parse(&avro_json).map_err(|e| {
                    ConverterError::translation(format!(
                        "generated Avro schema for {} was rejected: {}",
                        schema, e
                    ))
                })
            })
    }

    /// Translate an Avro schema into a structured schema
    pub fn to_structured_schema(&self, avro: &AvroSchema) -> ConverterResult<Schema> {
        let key = serde_json::to_string(avro).map_err(|e| {
            ConverterError::translation(format!("Avro schema is not serializable: {}", e))
        })?;
        self.to_connect_cache.get_or_try_insert(key, || {
            log::debug!("Translating Avro {:?} schema to structured", SchemaKind::from(avro));
            let mut ctx = ToConnectContext::default();
            self.connect_type(avro, &Attributes::new(), &mut ctx)
                .map(SchemaBuilder::build)
        })
    }

    /// Translate an Avro value and its schema into a structured pair
    pub fn to_structured_value(
        &self,
        avro: &AvroSchema,
        value: &AvroValue,
    ) -> ConverterResult<SchemaAndValue> {
        let schema = self.to_structured_schema(avro)?;
        let value = to_connect_value(&schema, value)?;
        Ok(SchemaAndValue::new(schema, value))
    }

    /// Translate a structured value into the Avro value of its translated schema
    pub fn to_binary_record_instance(
        &self,
        schema: &Schema,
        value: &FieldValue,
    ) -> ConverterResult<AvroValue> {
        to_avro_value(schema, value)
    }

    fn avro_type(
        &self,
        schema: &Schema,
        ctx: &mut ToAvroContext,
    ) -> ConverterResult<(JsonValue, Option<JsonMap<String, JsonValue>>)> {
        let (base, hoisted) = self.required_avro_type(schema, ctx)?;
        if !schema.is_optional() {
            return Ok((base, hoisted));
        }

        let null = JsonValue::String("null".to_string());
        let branches = match optional_branches(schema) {
            (0, _) => vec![null, base],
            _ => vec![base, null],
        };
        Ok((JsonValue::Array(branches), hoisted))
    }

    /// Avro type for the non-null form of `schema`, plus metadata the caller
    /// must store on its behalf
    fn required_avro_type(
        &self,
        schema: &Schema,
        ctx: &mut ToAvroContext,
    ) -> ConverterResult<(JsonValue, Option<JsonMap<String, JsonValue>>)> {
        if let Some(logical) = schema.logical_type() {
            let avro_json = match logical {
                LogicalType::Decimal { scale } => json!({
                    "type": "bytes",
                    "logicalType": "decimal",
                    "precision": decimal_precision(schema),
                    "scale": scale,
                }),
                LogicalType::Date => json!({"type": "int", "logicalType": "date"}),
                LogicalType::Time => json!({"type": "int", "logicalType": "time-millis"}),
                LogicalType::Timestamp => {
                    json!({"type": "long", "logicalType": "timestamp-millis"})
                }
            };
            return Ok((avro_json, None));
        }

        let primitive = |name: &str| JsonValue::String(name.to_string());
        match schema.schema_type() {
            SchemaType::Boolean => Ok((primitive("boolean"), self.connect_meta(schema))),
            SchemaType::Int8 | SchemaType::Int16 | SchemaType::Int32 => {
                Ok((primitive("int"), self.connect_meta(schema)))
            }
            SchemaType::Int64 => Ok((primitive("long"), self.connect_meta(schema))),
            SchemaType::Float32 => Ok((primitive("float"), self.connect_meta(schema))),
            SchemaType::Float64 => Ok((primitive("double"), self.connect_meta(schema))),
            SchemaType::String => Ok((primitive("string"), self.connect_meta(schema))),
            SchemaType::Bytes => Ok((primitive("bytes"), self.connect_meta(schema))),
            SchemaType::Array => {
                let items = element(schema)?;
                let (items_json, items_meta) = self.avro_type(items, ctx)?;
                let mut object = JsonMap::new();
                object.insert("type".into(), json!("array"));
                object.insert("items".into(), items_json);
                if let Some(meta) = items_meta {
                    object.insert(CONNECT_ITEMS_PROP.into(), JsonValue::Object(meta));
                }
                object.extend(self.connect_meta(schema).unwrap_or_default());
                Ok((JsonValue::Object(object), None))
            }
            SchemaType::Map => {
                require_string_keys(schema, "schema")?;
                let values = element(schema)?;
                let (values_json, values_meta) = self.avro_type(values, ctx)?;
                let mut object = JsonMap::new();
                object.insert("type".into(), json!("map"));
                object.insert("values".into(), values_json);
                if let Some(meta) = values_meta {
                    object.insert(CONNECT_VALUES_PROP.into(), JsonValue::Object(meta));
                }
                object.extend(self.connect_meta(schema).unwrap_or_default());
                Ok((JsonValue::Object(object), None))
            }
            SchemaType::Struct => self.record_type(schema, ctx).map(|record| (record, None)),
        }
    }

    fn record_type(&self, schema: &Schema, ctx: &mut ToAvroContext) -> ConverterResult<JsonValue> {
        let declared = match schema.name() {
            Some(name) => name.to_string(),
            None => ctx.next_default_name(),
        };
        validate_fullname(&declared)?;
        let fullname = ctx.qualify(&declared);
        let identity = record_identity(schema)?;

        if let Some(existing) = ctx.defined.get(&fullname) {
            if *existing == identity {
                return Ok(JsonValue::String(fullname));
            }
            return Err(ConverterError::translation(format!(
                "conflicting definitions of record '{}'",
                fullname
            )));
        }
        ctx.defined.insert(fullname.clone(), identity);

        let (namespace, name) = match fullname.rfind('.') {
            Some(i) => (Some(fullname[..i].to_string()), fullname[i + 1..].to_string()),
            None => (None, fullname.clone()),
        };

        let enclosing = std::mem::replace(&mut ctx.namespace, namespace.clone());
        let fields = self.record_fields(schema, ctx);
        ctx.namespace = enclosing;
        let fields = fields?;

        let mut object = JsonMap::new();
        object.insert("type".into(), json!("record"));
        object.insert("name".into(), JsonValue::String(name));
        if let Some(namespace) = namespace {
            object.insert("namespace".into(), JsonValue::String(namespace));
        }
        if let Some(doc) = schema.doc() {
            object.insert("doc".into(), JsonValue::String(doc.to_string()));
        }
        object.insert("fields".into(), JsonValue::Array(fields));

        if self.connect_meta_data {
            if let Some(name) = schema.name() {
                object.insert(CONNECT_NAME_PROP.into(), JsonValue::String(name.to_string()));
            }
            if let Some(version) = schema.version() {
                object.insert(CONNECT_VERSION_PROP.into(), JsonValue::from(version));
            }
            if !schema.parameters().is_empty() {
                object.insert(CONNECT_PARAMETERS_PROP.into(), parameters_json(schema));
            }
        }
        Ok(JsonValue::Object(object))
    }

    fn record_fields(
        &self,
        schema: &Schema,
        ctx: &mut ToAvroContext,
    ) -> ConverterResult<Vec<JsonValue>> {
        let mut fields = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            if !is_valid_avro_name(field.name()) {
                return Err(ConverterError::translation(format!(
                    "'{}' is not a valid Avro field name",
                    field.name()
                )));
            }
            let field_schema = field.schema();
            let (field_type, hoisted) = self.avro_type(field_schema, ctx)?;

            let mut object = JsonMap::new();
            object.insert("name".into(), JsonValue::String(field.name().to_string()));
            object.insert("type".into(), field_type);
            match field_schema.default_value() {
                // Decimal defaults have no JSON form that survives Avro default validation
                Some(default)
                    if !default.is_null()
                        && !matches!(
                            field_schema.logical_type(),
                            Some(LogicalType::Decimal { .. })
                        ) =>
                {
                    object.insert("default".into(), default_to_json(field_schema, default)?);
                }
                _ if field_schema.is_optional() => {
                    object.insert("default".into(), JsonValue::Null);
                }
                _ => {}
            }
            if let Some(meta) = hoisted {
                object.extend(meta);
            }
            fields.push(JsonValue::Object(object));
        }
        Ok(fields)
    }

    /// Connect metadata for a non-record schema, `None` when there is nothing to record
    fn connect_meta(&self, schema: &Schema) -> Option<JsonMap<String, JsonValue>> {
        if !self.connect_meta_data {
            return None;
        }
        let mut meta = JsonMap::new();
        match schema.schema_type() {
            SchemaType::Int8 => {
                meta.insert(CONNECT_TYPE_PROP.into(), json!("int8"));
            }
            SchemaType::Int16 => {
                meta.insert(CONNECT_TYPE_PROP.into(), json!("int16"));
            }
            _ => {}
        }
        if let Some(name) = schema.name() {
            meta.insert(CONNECT_NAME_PROP.into(), JsonValue::String(name.to_string()));
        }
        if let Some(version) = schema.version() {
            meta.insert(CONNECT_VERSION_PROP.into(), JsonValue::from(version));
        }
        if let Some(doc) = schema.doc() {
            meta.insert(CONNECT_DOC_PROP.into(), JsonValue::String(doc.to_string()));
        }
        if !schema.parameters().is_empty() {
            meta.insert(CONNECT_PARAMETERS_PROP.into(), parameters_json(schema));
        }
        (!meta.is_empty()).then_some(meta)
    }

    /// Translate an Avro schema; `host` holds properties stored on its behalf
    /// by the enclosing field, array or map
    fn connect_type(
        &self,
        avro: &AvroSchema,
        host: &Attributes,
        ctx: &mut ToConnectContext,
    ) -> ConverterResult<SchemaBuilder> {
        let primitive = |schema_type: SchemaType| {
            ConnectMeta::from_attributes(host).apply(SchemaBuilder::new(schema_type))
        };

        let builder = match avro {
            AvroSchema::Boolean => primitive(SchemaType::Boolean),
            AvroSchema::Int => {
                let schema_type = match host.get(CONNECT_TYPE_PROP).and_then(JsonValue::as_str) {
                    Some("int8") => SchemaType::Int8,
                    Some("int16") => SchemaType::Int16,
                    _ => SchemaType::Int32,
                };
                primitive(schema_type)
            }
            AvroSchema::Long | AvroSchema::TimeMicros | AvroSchema::TimestampMicros => {
                primitive(SchemaType::Int64)
            }
            AvroSchema::Float => primitive(SchemaType::Float32),
            AvroSchema::Double => primitive(SchemaType::Float64),
            AvroSchema::String | AvroSchema::Uuid | AvroSchema::Enum(_) => {
                primitive(SchemaType::String)
            }
            AvroSchema::Bytes | AvroSchema::Fixed(_) => primitive(SchemaType::Bytes),
            AvroSchema::Decimal(DecimalSchema {
                precision, scale, ..
            }) => {
                let scale = u32::try_from(*scale).map_err(|_| {
                    ConverterError::translation(format!("decimal scale {} is out of range", scale))
                })?;
                let builder = LogicalType::decimal(scale);
                if *precision == DEFAULT_DECIMAL_PRECISION {
                    builder
                } else {
                    builder.parameter(DECIMAL_PRECISION_PARAM, precision.to_string())
                }
            }
            AvroSchema::Date => LogicalType::date(),
            AvroSchema::TimeMillis => LogicalType::time(),
            AvroSchema::TimestampMillis => LogicalType::timestamp(),
            AvroSchema::Array(ArraySchema { items, attributes }) => {
                let items_host = nested_attributes(attributes, CONNECT_ITEMS_PROP);
                let items = self.connect_type(items, &items_host, ctx)?.build();
                ConnectMeta::from_attributes(attributes).apply(SchemaBuilder::array(items))
            }
            AvroSchema::Map(MapSchema { types, attributes }) => {
                let values_host = nested_attributes(attributes, CONNECT_VALUES_PROP);
                let values = self.connect_type(types, &values_host, ctx)?.build();
                ConnectMeta::from_attributes(attributes)
                    .apply(SchemaBuilder::map(Schema::string(), values))
            }
            AvroSchema::Union(union) => {
                let variants = union.variants();
                let has_null = variants.iter().any(|v| matches!(v, AvroSchema::Null));
                let mut present = variants.iter().filter(|v| !matches!(v, AvroSchema::Null));
                match (present.next(), present.next()) {
                    (Some(only), None) => {
                        let builder = self.connect_type(only, host, ctx)?;
                        if has_null { builder.optional() } else { builder }
                    }
                    _ => {
                        return Err(ConverterError::translation(format!(
                            "union of {} branches has no structured equivalent",
                            variants.len()
                        )));
                    }
                }
            }
            AvroSchema::Record(record) => SchemaBuilder::from(self.connect_record(record, ctx)?),
            AvroSchema::Ref { name } => {
                let fullname = name.fullname(None);
                match ctx.converted.get(&fullname) {
                    Some(schema) => SchemaBuilder::from(schema.clone()),
                    None if ctx.in_progress.contains(&fullname) => {
                        return Err(ConverterError::translation(format!(
                            "recursive record '{}' has no structured equivalent",
                            fullname
                        )));
                    }
                    None => {
                        return Err(ConverterError::translation(format!(
                            "unresolved reference to '{}'",
                            fullname
                        )));
                    }
                }
            }
            other => {
                return Err(ConverterError::translation(format!(
                    "Avro {:?} schema has no structured equivalent",
                    SchemaKind::from(other)
                )));
            }
        };
        Ok(builder)
    }

    fn connect_record(
        &self,
        record: &RecordSchema,
        ctx: &mut ToConnectContext,
    ) -> ConverterResult<Schema> {
        let fullname = record.name.fullname(None);
        if let Some(done) = ctx.converted.get(&fullname) {
            return Ok(done.clone());
        }
        if !ctx.in_progress.insert(fullname.clone()) {
            return Err(ConverterError::translation(format!(
                "recursive record '{}' has no structured equivalent",
                fullname
            )));
        }

        let meta = ConnectMeta::from_attributes(&record.attributes);
        let mut builder = SchemaBuilder::structure();
        match (&meta.name, is_default_name(&fullname)) {
            (Some(_), _) | (None, true) => {}
            (None, false) => builder = builder.name(fullname.clone()),
        }
        if let Some(doc) = &record.doc {
            builder = builder.doc(doc.clone());
        }
        builder = meta.apply(builder);

        for field in &record.fields {
            let mut field_builder = self
                .connect_type(&field.schema, &field.custom_attributes, ctx)
                .map_err(|e| prefix_field(&fullname, &field.name, e))?;
            if let Some(default) = field.default.as_ref().filter(|d| !d.is_null()) {
                let field_schema = field_builder.clone().build();
                let value = default_from_json(&field_schema, default)
                    .map_err(|e| prefix_field(&fullname, &field.name, e))?;
                field_builder = field_builder.default_value(value);
            }
            builder = builder.field(field.name.clone(), field_builder.build());
        }

        let schema = builder.build();
        ctx.in_progress.remove(&fullname);
        ctx.converted.insert(fullname, schema.clone());
        Ok(schema)
    }
}

#[derive(Debug, Default)]
struct ToAvroContext {
    /// Fully qualified record name → identity of its definition
    defined: HashMap<String, String>,
    default_names: usize,
    /// Namespace inherited by nested records without one
    namespace: Option<String>,
}

impl ToAvroContext {
    fn next_default_name(&mut self) -> String {
        self.default_names += 1;
        if self.default_names == 1 {
            format!("{}.{}", DEFAULT_NAMESPACE, DEFAULT_SCHEMA_NAME)
        } else {
            format!(
                "{}.{}{}",
                DEFAULT_NAMESPACE, DEFAULT_SCHEMA_NAME, self.default_names
            )
        }
    }

    fn qualify(&self, name: &str) -> String {
        match &self.namespace {
            Some(namespace) if !name.contains('.') => format!("{}.{}", namespace, name),
            _ => name.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct ToConnectContext {
    converted: HashMap<String, Schema>,
    in_progress: HashSet<String>,
}

/// Connect properties recovered from Avro schema attributes
#[derive(Debug, Default)]
struct ConnectMeta {
    name: Option<String>,
    version: Option<i32>,
    doc: Option<String>,
    parameters: BTreeMap<String, String>,
}

impl ConnectMeta {
    fn from_attributes(attributes: &Attributes) -> Self {
        let parameters = attributes
            .get(CONNECT_PARAMETERS_PROP)
            .and_then(JsonValue::as_object)
            .map(|params| {
                params
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: attributes
                .get(CONNECT_NAME_PROP)
                .and_then(JsonValue::as_str)
                .map(str::to_string),
            version: attributes
                .get(CONNECT_VERSION_PROP)
                .and_then(JsonValue::as_i64)
                .and_then(|v| i32::try_from(v).ok()),
            doc: attributes
                .get(CONNECT_DOC_PROP)
                .and_then(JsonValue::as_str)
                .map(str::to_string),
            parameters,
        }
    }

    fn apply(self, mut builder: SchemaBuilder) -> SchemaBuilder {
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        if let Some(version) = self.version {
            builder = builder.version(version);
        }
        if let Some(doc) = self.doc {
            builder = builder.doc(doc);
        }
        for (key, value) in self.parameters {
            builder = builder.parameter(key, value);
        }
        builder
    }
}

fn element(schema: &Schema) -> ConverterResult<&Schema> {
    schema.value_schema().ok_or_else(|| {
        ConverterError::translation(format!("{} has no element schema", schema))
    })
}

fn parameters_json(schema: &Schema) -> JsonValue {
    JsonValue::Object(
        schema
            .parameters()
            .iter()
            .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
            .collect(),
    )
}

fn nested_attributes(attributes: &Attributes, key: &str) -> Attributes {
    attributes
        .get(key)
        .and_then(JsonValue::as_object)
        .map(|meta| meta.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

/// Everything that makes two struct definitions with one name interchangeable
fn record_identity(schema: &Schema) -> ConverterResult<String> {
    serde_json::to_string(&(
        schema.name(),
        schema.version(),
        schema.doc(),
        schema.parameters(),
        schema.fields(),
    ))
    .map_err(|e| ConverterError::translation(format!("cannot fingerprint {}: {}", schema, e)))
}

fn is_default_name(fullname: &str) -> bool {
    fullname
        .strip_prefix(DEFAULT_NAMESPACE)
        .and_then(|rest| rest.strip_prefix('.'))
        .and_then(|name| name.strip_prefix(DEFAULT_SCHEMA_NAME))
        .is_some_and(|suffix| suffix.chars().all(|c| c.is_ascii_digit()))
}

fn is_valid_avro_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_fullname(fullname: &str) -> ConverterResult<()> {
    if fullname.split('.').all(is_valid_avro_name) {
        Ok(())
    } else {
        Err(ConverterError::translation(format!(
            "'{}' is not a valid Avro record name",
            fullname
        )))
    }
}

fn prefix_field(record: &str, field: &str, err: ConverterError) -> ConverterError {
    match err {
        ConverterError::SchemaTranslation { message } => {
            ConverterError::translation(format!("{}.{}: {}", record, field, message))
        }
        other => other,
    }
}
