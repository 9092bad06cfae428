//! Avro Object Container codec holding one record per document
//!
//! Each document carries its writer schema in the container header, so a
//! reader needs no external registry to decode it.

use crate::registryless::error::{ConverterError, ConverterResult};
use apache_avro::{Codec, Reader, Schema as AvroSchema, Writer, types::Value as AvroValue};

/// A record read back from a container, with the schema it was written with
#[derive(Debug, Clone)]
pub struct ContainerRecord {
    pub writer_schema: AvroSchema,
    pub value: AvroValue,
}

/// Container codec bound to the topic it encodes for, used in diagnostics
pub struct AvroContainerCodec<'a> {
    topic: &'a str,
}

impl<'a> AvroContainerCodec<'a> {
    pub fn new(topic: &'a str) -> Self {
        Self { topic }
    }

    /// Write `record` as the only record of an uncompressed container
    pub fn encode(&self, schema: &AvroSchema, record: AvroValue) -> ConverterResult<Vec<u8>> {
        let mut writer = Writer::with_codec(schema, Vec::new(), Codec::Null);
        writer.append(record).map_err(|e| {
            log::error!("Avro append failed for topic {}: {:?}", self.topic, e);
            ConverterError::serialization(self.topic, format!("Failed to write record: {}", e), e)
        })?;
        writer.into_inner().map_err(|e| {
            log::error!("Avro flush failed for topic {}: {:?}", self.topic, e);
            ConverterError::serialization(self.topic, format!("Failed to flush container: {}", e), e)
        })
    }

    /// Read the first record of a container
    ///
    /// With a `reader_schema` the record is resolved against it; otherwise it is
    /// returned as written. A container with no records is an error.
    pub fn decode(
        &self,
        bytes: &[u8],
        reader_schema: Option<&AvroSchema>,
    ) -> ConverterResult<ContainerRecord> {
        let opened = match reader_schema {
            Some(schema) => Reader::with_schema(schema, bytes),
            None => Reader::new(bytes),
        };
        let mut reader = opened.map_err(|e| {
            ConverterError::deserialization(
                self.topic,
                format!("Invalid Avro container: {}", e),
                e,
            )
        })?;
        let writer_schema = reader.writer_schema().clone();

        let value = match reader.next() {
            Some(Ok(value)) => value,
            Some(Err(e)) => {
                log::error!("Avro read failed for topic {}: {:?}", self.topic, e);
                return Err(ConverterError::deserialization(
                    self.topic,
                    format!("Failed to read record: {}", e),
                    e,
                ));
            }
            None => {
                log::warn!("Avro container for topic {} holds no records", self.topic);
                return Err(ConverterError::malformed(
                    self.topic,
                    "container holds no records",
                ));
            }
        };

        if reader.next().is_some() {
            log::warn!(
                "Avro container for topic {} holds more than one record; only the first is used",
                self.topic
            );
        }

        Ok(ContainerRecord {
            writer_schema,
            value,
        })
    }
}
