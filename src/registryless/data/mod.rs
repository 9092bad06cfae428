//! Structured data model
//!
//! The host pipeline's generic record representation, independent of any wire
//! format: [`Schema`] describes a record, [`FieldValue`] holds an instance.

mod logical;
mod schema;
mod value;

pub use logical::{
    DATE_NAME, DECIMAL_NAME, DECIMAL_PRECISION_PARAM, DECIMAL_SCALE_PARAM, LogicalType, TIME_NAME,
    TIMESTAMP_NAME,
};
pub use schema::{Field, Schema, SchemaBuilder, SchemaType};
pub use value::{FieldValue, SchemaAndValue};
