//! # registryless-avro
//!
//! A converter between structured records and Avro Object Container documents
//! that never talks to a schema registry. Every encoded document embeds its
//! writer schema; a reader schema may be supplied out-of-band as an `.avsc`
//! file.
//!
//! ## Features
//!
//! - **Bidirectional Schema Translation**: structured schemas to Avro and back,
//!   with connect metadata so narrow integers and versions survive a round trip
//! - **Logical Types**: decimal, date, time-millis and timestamp-millis
//! - **Bounded Caching**: one LRU translation cache per direction, safe to
//!   share across worker threads
//! - **Explicit Schema Policy**: strict mode requires `schema.path`; permissive
//!   mode derives schemas per record
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use registryless_avro::{
//!     AvroConverter, Converter, ConverterSettings, FieldValue, Schema, SchemaBuilder,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = AvroConverter::permissive();
//!     converter.configure(&ConverterSettings::new(), false)?;
//!
//!     let schema = SchemaBuilder::structure()
//!         .name("dog")
//!         .field("name", Schema::string())
//!         .field("breed", Schema::string())
//!         .build();
//!     let dog = FieldValue::structure([
//!         ("name", FieldValue::from("Beamer")),
//!         ("breed", FieldValue::from("Border Collie")),
//!     ]);
//!
//!     let bytes = converter.from_connect_data("dogs", Some(&schema), &dog)?;
//!     let decoded = converter.to_connect_data("dogs", &bytes)?;
//!     assert_eq!(decoded.schema, schema);
//!     assert_eq!(decoded.value, dog);
//!     Ok(())
//! }
//! ```

#![allow(clippy::wrong_self_convention)]

pub mod registryless;

// Re-export main API at crate root for easy access
pub use registryless::{
    // Converter
    AvroConverter,
    Converter,
    // Errors
    ConverterError,
    ConverterResult,
    // Configuration
    ConverterSettings,
    // Data model
    Field,
    FieldValue,
    LogicalType,
    ResolvedConfig,
    Schema,
    SchemaAndValue,
    SchemaBuilder,
    SchemaPolicy,
    SchemaTranslator,
    SchemaType,
};
