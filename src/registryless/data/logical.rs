//! Logical types layered on primitive structured schemas
//!
//! A logical type is a primitive schema with a well-known name. Decimals also
//! carry their scale as a schema parameter.

use super::schema::{Schema, SchemaBuilder, SchemaType};

pub const DECIMAL_NAME: &str = "org.apache.kafka.connect.data.Decimal";
pub const DATE_NAME: &str = "org.apache.kafka.connect.data.Date";
pub const TIME_NAME: &str = "org.apache.kafka.connect.data.Time";
pub const TIMESTAMP_NAME: &str = "org.apache.kafka.connect.data.Timestamp";

/// Schema parameter holding a decimal's scale
pub const DECIMAL_SCALE_PARAM: &str = "scale";
/// Optional schema parameter holding a decimal's precision
pub const DECIMAL_PRECISION_PARAM: &str = "connect.decimal.precision";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalType {
    Decimal { scale: u32 },
    Date,
    Time,
    Timestamp,
}

impl LogicalType {
    /// Builder for a decimal schema with the given scale
    pub fn decimal(scale: u32) -> SchemaBuilder {
        SchemaBuilder::new(SchemaType::Bytes)
            .name(DECIMAL_NAME)
            .version(1)
            .parameter(DECIMAL_SCALE_PARAM, scale.to_string())
    }

    /// Builder for a date schema (days since the Unix epoch)
    pub fn date() -> SchemaBuilder {
        SchemaBuilder::new(SchemaType::Int32).name(DATE_NAME).version(1)
    }

    /// Builder for a time-of-day schema (milliseconds since midnight)
    pub fn time() -> SchemaBuilder {
        SchemaBuilder::new(SchemaType::Int32).name(TIME_NAME).version(1)
    }

    /// Builder for a timestamp schema (milliseconds since the Unix epoch)
    pub fn timestamp() -> SchemaBuilder {
        SchemaBuilder::new(SchemaType::Int64)
            .name(TIMESTAMP_NAME)
            .version(1)
    }

    /// Detect the logical type of a schema by name and underlying type
    pub fn of(schema: &Schema) -> Option<LogicalType> {
        match (schema.name()?, schema.schema_type()) {
            (DECIMAL_NAME, SchemaType::Bytes) => {
                let scale = schema
                    .parameter(DECIMAL_SCALE_PARAM)
                    .and_then(|s| s.parse::<u32>().ok())
                    .unwrap_or(0);
                Some(LogicalType::Decimal { scale })
            }
            (DATE_NAME, SchemaType::Int32) => Some(LogicalType::Date),
            (TIME_NAME, SchemaType::Int32) => Some(LogicalType::Time),
            (TIMESTAMP_NAME, SchemaType::Int64) => Some(LogicalType::Timestamp),
            _ => None,
        }
    }
}
