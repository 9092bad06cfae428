//! Wire and text encodings of converted records
//!
//! - [`avro_codec`]: Avro Object Container documents, one record each
//! - [`json`]: JSON rendering of structured values for tooling

pub mod avro_codec;
pub mod json;

pub use avro_codec::{AvroContainerCodec, ContainerRecord};
