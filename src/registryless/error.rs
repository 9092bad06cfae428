/*!
# Converter Error Types

Every failure the converter surfaces to its host pipeline. Configuration
problems are fatal at startup; the remaining variants are fatal for a single
encode or decode call and are never retried here.
*/

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for the converter
#[derive(Debug, Error)]
pub enum ConverterError {
    /// Malformed or missing configuration; prevents the converter from starting
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Encode or decode attempted before a successful `configure`
    #[error("Converter used before configure() was called")]
    NotConfigured,

    /// Structural mismatch between the structured and Avro type systems
    #[error("Schema translation failed: {message}")]
    SchemaTranslation { message: String },

    /// The Avro codec layer failed to write a record
    #[error("Error serializing Avro data for topic {topic}: {message}")]
    Serialization {
        topic: String,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The Avro codec layer failed to read a record, or the document held none
    #[error("Failed to deserialize Avro data from topic {topic}: {message}")]
    Deserialization {
        topic: String,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl ConverterError {
    /// Helper to create configuration errors without an underlying cause
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Helper to create configuration errors that wrap a cause
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create schema translation errors
    pub fn translation(message: impl Into<String>) -> Self {
        Self::SchemaTranslation {
            message: message.into(),
        }
    }

    /// Helper to create serialization errors wrapping an Avro failure
    pub fn serialization(
        topic: impl Into<String>,
        message: impl Into<String>,
        source: apache_avro::Error,
    ) -> Self {
        Self::Serialization {
            topic: topic.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create deserialization errors wrapping an Avro failure
    pub fn deserialization(
        topic: impl Into<String>,
        message: impl Into<String>,
        source: apache_avro::Error,
    ) -> Self {
        Self::Deserialization {
            topic: topic.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper for malformed input that has no codec-level cause
    pub fn malformed(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Deserialization {
            topic: topic.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    pub fn is_translation(&self) -> bool {
        matches!(self, Self::SchemaTranslation { .. })
    }
}

/// Type alias for Results using ConverterError
pub type ConverterResult<T> = Result<T, ConverterError>;
