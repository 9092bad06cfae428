//! Registryless Avro converter
//!
//! Encodes each structured record as a complete Avro Object Container
//! document, writer schema included, so that no schema registry is needed on
//! either side. The converter is configured once and may then be shared
//! across worker threads.

use crate::registryless::config::{
    ConverterOptions, ConverterSettings, ResolvedConfig, SchemaPolicy,
};
use crate::registryless::data::{FieldValue, Schema, SchemaAndValue};
use crate::registryless::error::{ConverterError, ConverterResult};
use crate::registryless::schema::{SchemaTranslator, to_connect_value};
use crate::registryless::serialization::AvroContainerCodec;
use std::sync::OnceLock;

/// Converts structured records to bytes and back for a host pipeline
pub trait Converter: Send + Sync {
    /// Resolve settings; must succeed exactly once before any conversion
    fn configure(&self, settings: &ConverterSettings, is_key: bool) -> ConverterResult<()>;

    /// Encode a record for `topic`
    ///
    /// Without a schema, the configured schema is used, else one is inferred
    /// from the value.
    fn from_connect_data(
        &self,
        topic: &str,
        schema: Option<&Schema>,
        value: &FieldValue,
    ) -> ConverterResult<Vec<u8>>;

    /// Decode a record received on `topic`
    fn to_connect_data(&self, topic: &str, bytes: &[u8]) -> ConverterResult<SchemaAndValue>;
}

#[derive(Debug)]
struct Configured {
    config: ResolvedConfig,
    translator: SchemaTranslator,
}

/// Avro Object Container converter without a schema registry
///
/// # Examples
///
/// ```no_run
/// use registryless_avro::{AvroConverter, Converter, ConverterSettings, FieldValue};
///
/// let converter = AvroConverter::new();
/// let settings = ConverterSettings::new().with("schema.path", "schemas/dog.avsc");
/// converter.configure(&settings, false)?;
///
/// let dog = FieldValue::structure([
///     ("name", FieldValue::from("Beamer")),
///     ("breed", FieldValue::from("Border Collie")),
/// ]);
/// let bytes = converter.from_connect_data("dogs", None, &dog)?;
/// let decoded = converter.to_connect_data("dogs", &bytes)?;
/// assert_eq!(decoded.value, dog);
/// # Ok::<(), registryless_avro::ConverterError>(())
/// ```
#[derive(Debug, Default)]
pub struct AvroConverter {
    policy: SchemaPolicy,
    state: OnceLock<Configured>,
}

impl AvroConverter {
    /// Converter that requires `schema.path`
    pub fn new() -> Self {
        Self::with_policy(SchemaPolicy::Strict)
    }

    /// Converter that derives schemas per record when `schema.path` is absent
    pub fn permissive() -> Self {
        Self::with_policy(SchemaPolicy::Permissive)
    }

    pub fn with_policy(policy: SchemaPolicy) -> Self {
        Self {
            policy,
            state: OnceLock::new(),
        }
    }

    pub fn policy(&self) -> SchemaPolicy {
        self.policy
    }

    pub fn is_configured(&self) -> bool {
        self.state.get().is_some()
    }

    /// Resolved configuration, once `configure` has succeeded
    pub fn config(&self) -> Option<&ResolvedConfig> {
        self.state.get().map(|state| &state.config)
    }

    /// Schema translator, once `configure` has succeeded
    pub fn translator(&self) -> Option<&SchemaTranslator> {
        self.state.get().map(|state| &state.translator)
    }

    fn configured(&self) -> ConverterResult<&Configured> {
        self.state.get().ok_or(ConverterError::NotConfigured)
    }
}

impl Converter for AvroConverter {
    fn configure(&self, settings: &ConverterSettings, is_key: bool) -> ConverterResult<()> {
        if self.is_configured() {
            return Err(ConverterError::config("converter is already configured"));
        }

        let options = ConverterOptions::from_settings(settings, self.policy)?;
        let translator = SchemaTranslator::new(options.cache_size, options.connect_meta_data);
        let config = options.resolve(is_key, &translator)?;

        self.state
            .set(Configured { config, translator })
            .map_err(|_| ConverterError::config("converter is already configured"))
    }

    fn from_connect_data(
        &self,
        topic: &str,
        schema: Option<&Schema>,
        value: &FieldValue,
    ) -> ConverterResult<Vec<u8>> {
        let Configured { config, translator } = self.configured()?;

        let inferred;
        let schema = match (schema, &config.structured_schema) {
            (Some(schema), _) | (None, Some(schema)) => schema,
            (None, None) => {
                inferred = Schema::infer(value)?;
                &inferred
            }
        };

        let record = translator.to_binary_record_instance(schema, value)?;
        let codec = AvroContainerCodec::new(topic);
        match &config.binary_schema {
            Some(writer_schema) => {
                let resolved = record.resolve(writer_schema).map_err(|e| {
                    ConverterError::serialization(
                        topic,
                        format!("Record does not match the configured schema: {}", e),
                        e,
                    )
                })?;
                codec.encode(writer_schema, resolved)
            }
            None => {
                let writer_schema = translator.to_binary_schema(schema)?;
                codec.encode(&writer_schema, record)
            }
        }
    }

    fn to_connect_data(&self, topic: &str, bytes: &[u8]) -> ConverterResult<SchemaAndValue> {
        let Configured { config, translator } = self.configured()?;

        let record = AvroContainerCodec::new(topic).decode(bytes, config.binary_schema.as_ref())?;
        let translated = match &config.structured_schema {
            Some(schema) => to_connect_value(schema, &record.value)
                .map(|value| SchemaAndValue::new(schema.clone(), value)),
            None => translator.to_structured_value(&record.writer_schema, &record.value),
        };
        translated.map_err(|e| match e {
            ConverterError::SchemaTranslation { message } => ConverterError::malformed(
                topic,
                format!("record has no structured form: {}", message),
            ),
            other => other,
        })
    }
}
