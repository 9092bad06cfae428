//! Schema translation between the structured data model and Avro
//!
//! - [`SchemaTranslator`]: schema translation in both directions, backed by
//!   one bounded [`TranslationCache`] per direction
//! - [`values`]: record value translation guided by a structured schema

pub mod cache;
pub mod translator;
pub mod values;

pub use cache::{CacheStats, DEFAULT_CACHE_SIZE, TranslationCache};
pub use translator::{DEFAULT_NAMESPACE, DEFAULT_SCHEMA_NAME, SchemaTranslator};
pub use values::{to_avro_value, to_connect_value};
