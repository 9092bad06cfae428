pub mod config;
pub mod converter;
pub mod data;
pub mod error;
pub mod schema;
pub mod serialization;

pub use config::{ConverterSettings, ResolvedConfig, SchemaPolicy};
pub use converter::{AvroConverter, Converter};
pub use data::{Field, FieldValue, LogicalType, Schema, SchemaAndValue, SchemaBuilder, SchemaType};
pub use error::{ConverterError, ConverterResult};
pub use schema::SchemaTranslator;
