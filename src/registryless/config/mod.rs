//! Converter configuration
//!
//! Settings are resolved exactly once at startup into an immutable
//! [`ResolvedConfig`]. Resolution precedence for each key is the setting
//! itself, then the built-in default; a setting that is present but unusable
//! either falls back with a warning or fails fast, depending on the key.

mod settings;

pub use settings::ConverterSettings;

use crate::registryless::data::Schema;
use crate::registryless::error::{ConverterError, ConverterResult};
use crate::registryless::schema::{DEFAULT_CACHE_SIZE, SchemaTranslator};
use apache_avro::Schema as AvroSchema;
use std::fs;
use std::path::{Path, PathBuf};

/// Path of the `.avsc` file holding the writer/reader schema
pub const SCHEMA_PATH_CONFIG: &str = "schema.path";
/// Capacity of each translation cache
pub const SCHEMA_CACHE_SIZE_CONFIG: &str = "schema.cache.size";
/// Whether derived Avro schemas carry connect metadata properties
pub const CONNECT_META_DATA_CONFIG: &str = "connect.meta.data";

/// What the converter does when no schema file is configured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemaPolicy {
    /// `schema.path` is mandatory
    #[default]
    Strict,
    /// Without `schema.path` the writer schema is derived from each record on
    /// encode, and the embedded writer schema is used on decode
    Permissive,
}

/// Settings parsed into typed options, before any file is read
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterOptions {
    pub schema_path: Option<PathBuf>,
    pub cache_size: usize,
    pub connect_meta_data: bool,
    pub policy: SchemaPolicy,
}

impl ConverterOptions {
    pub fn from_settings(
        settings: &ConverterSettings,
        policy: SchemaPolicy,
    ) -> ConverterResult<Self> {
        let schema_path = settings
            .get_str(SCHEMA_PATH_CONFIG)
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        if schema_path.is_none() && policy == SchemaPolicy::Strict {
            return Err(ConverterError::config(format!(
                "{} is required; the converter has no schema to read or write with",
                SCHEMA_PATH_CONFIG
            )));
        }

        Ok(Self {
            schema_path,
            cache_size: cache_size(settings)?,
            connect_meta_data: settings.get_bool(CONNECT_META_DATA_CONFIG).unwrap_or(true),
            policy,
        })
    }

    /// Load the configured schema file and finish resolution
    pub fn resolve(
        self,
        is_key: bool,
        translator: &SchemaTranslator,
    ) -> ConverterResult<ResolvedConfig> {
        let (binary_schema, structured_schema) = match &self.schema_path {
            Some(path) => {
                let binary = load_schema(path)?;
                let structured = translator.to_structured_schema(&binary).map_err(|e| {
                    ConverterError::config_with_source(
                        format!(
                            "Avro schema in {} has no structured equivalent",
                            path.display()
                        ),
                        e,
                    )
                })?;
                (Some(binary), Some(structured))
            }
            None => (None, None),
        };

        match &self.schema_path {
            Some(path) => log::info!(
                "Configured Avro {} converter with schema {} (cache size {})",
                if is_key { "key" } else { "value" },
                path.display(),
                self.cache_size
            ),
            None => log::info!(
                "Configured Avro {} converter without a schema file; schemas are derived per record (cache size {})",
                if is_key { "key" } else { "value" },
                self.cache_size
            ),
        }

        Ok(ResolvedConfig {
            binary_schema,
            structured_schema,
            cache_size: self.cache_size,
            is_key,
            policy: self.policy,
            connect_meta_data: self.connect_meta_data,
            schema_path: self.schema_path,
        })
    }
}

/// Immutable outcome of `configure`
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Writer schema for every encode and reader schema for every decode
    pub binary_schema: Option<AvroSchema>,
    /// Structured translation of `binary_schema`
    pub structured_schema: Option<Schema>,
    pub cache_size: usize,
    pub is_key: bool,
    pub policy: SchemaPolicy,
    pub connect_meta_data: bool,
    pub schema_path: Option<PathBuf>,
}

fn cache_size(settings: &ConverterSettings) -> ConverterResult<usize> {
    if !settings.contains(SCHEMA_CACHE_SIZE_CONFIG) {
        return Ok(DEFAULT_CACHE_SIZE);
    }
    match settings.get_int(SCHEMA_CACHE_SIZE_CONFIG) {
        Some(size) if size > 0 => usize::try_from(size).map_err(|_| {
            ConverterError::config(format!("{} {} is too large", SCHEMA_CACHE_SIZE_CONFIG, size))
        }),
        Some(size) => Err(ConverterError::config(format!(
            "{} must be positive, got {}",
            SCHEMA_CACHE_SIZE_CONFIG, size
        ))),
        None => {
            log::warn!(
                "{} is not an integer ({:?}); using default {}",
                SCHEMA_CACHE_SIZE_CONFIG,
                settings.get(SCHEMA_CACHE_SIZE_CONFIG),
                DEFAULT_CACHE_SIZE
            );
            Ok(DEFAULT_CACHE_SIZE)
        }
    }
}

/// Read and parse an `.avsc` file
pub fn load_schema(path: &Path) -> ConverterResult<AvroSchema> {
    let text = fs::read_to_string(path).map_err(|e| {
        ConverterError::config_with_source(
            format!("Unable to read Avro schema file {}", path.display()),
            e,
        )
    })?;
    AvroSchema::parse_str(&text).map_err(|e| {
        ConverterError::config_with_source(
            format!("Unable to parse Avro schema from {}: {}", path.display(), e),
            e,
        )
    })
}
