// Translating hand-written .avsc files and decoding containers they describe

use crate::unit::common::*;
use apache_avro::types::{Record, Value as AvroValue};
use apache_avro::{Codec, Writer};
use chrono::NaiveDate;
use registryless_avro::registryless::config::load_schema;
use registryless_avro::registryless::schema::SchemaTranslator;
use rust_decimal::Decimal;
use std::collections::HashMap;

fn order_schema() -> Schema {
    let avro = load_schema(&resource("order.avsc")).unwrap();
    SchemaTranslator::default().to_structured_schema(&avro).unwrap()
}

fn field_type(schema: &Schema, name: &str) -> SchemaType {
    schema.field(name).unwrap().schema().schema_type()
}

#[test]
fn test_order_schema_structure() {
    let schema = order_schema();

    assert_eq!(schema.name(), Some("com.example.shop.Order"));
    assert_eq!(schema.doc(), Some("A customer order"));
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        vec![
            "id", "status", "checksum", "total", "placed", "quantity", "coupon", "lines",
            "attributes"
        ]
    );

    assert_eq!(field_type(&schema, "id"), SchemaType::String);
    assert_eq!(field_type(&schema, "status"), SchemaType::String);
    assert_eq!(field_type(&schema, "checksum"), SchemaType::Bytes);
    assert_eq!(field_type(&schema, "quantity"), SchemaType::Int32);
    assert_eq!(field_type(&schema, "attributes"), SchemaType::Map);
}

#[test]
fn test_logical_types_and_precision() {
    let schema = order_schema();

    let total = schema.field("total").unwrap().schema();
    assert_eq!(total.logical_type(), Some(LogicalType::Decimal { scale: 2 }));
    assert_eq!(total.parameter("connect.decimal.precision"), Some("10"));

    let placed = schema.field("placed").unwrap().schema();
    assert_eq!(placed.logical_type(), Some(LogicalType::Date));
}

#[test]
fn test_defaults_and_optionals() {
    let schema = order_schema();

    let status = schema.field("status").unwrap().schema();
    assert_eq!(status.default_value(), Some(&FieldValue::from("NEW")));

    let quantity = schema.field("quantity").unwrap().schema();
    assert_eq!(quantity.default_value(), Some(&FieldValue::from(1)));

    let coupon = schema.field("coupon").unwrap().schema();
    assert!(coupon.is_optional());
    assert_eq!(coupon.default_value(), None);
}

#[test]
fn test_nested_record_inherits_namespace() {
    let schema = order_schema();

    let lines = schema.field("lines").unwrap().schema();
    let line = lines.value_schema().unwrap();
    assert_eq!(line.name(), Some("com.example.shop.Line"));
    assert_eq!(field_type(line, "price"), SchemaType::Float64);
}

#[test]
fn test_strict_converter_decodes_foreign_container() {
    let avro = load_schema(&resource("order.avsc")).unwrap();

    let mut record = Record::new(&avro).unwrap();
    record.put("id", AvroValue::Uuid("6f1c2a9e-3b1d-4e0a-9d55-2f7c1e8b0a11".parse().unwrap()));
    record.put("status", AvroValue::Enum(1, "PAID".into()));
    record.put("checksum", AvroValue::Fixed(4, vec![1, 2, 3, 4]));
    record.put(
        "total",
        AvroValue::Decimal(apache_avro::Decimal::from(vec![0x00, 0x00, 0x00, 0x30, 0x39])),
    );
    record.put("placed", AvroValue::Date(19797));
    record.put("quantity", AvroValue::Int(3));
    record.put("coupon", AvroValue::Union(0, Box::new(AvroValue::Null)));
    record.put(
        "lines",
        AvroValue::Array(vec![AvroValue::Record(vec![
            ("sku".into(), AvroValue::String("A-1".into())),
            ("price".into(), AvroValue::Double(41.15)),
        ])]),
    );
    record.put(
        "attributes",
        AvroValue::Map(HashMap::from([("gift".to_string(), AvroValue::Long(1))])),
    );

    let mut writer = Writer::with_codec(&avro, Vec::new(), Codec::Null);
    writer.append(record).unwrap();
    let bytes = writer.into_inner().unwrap();

    let converter = AvroConverter::new();
    converter
        .configure(&settings_with_schema(&resource("order.avsc")), false)
        .unwrap();
    let decoded = converter.to_connect_data("orders", &bytes).unwrap();
    let value = decoded.value;

    assert_eq!(
        value.get("id"),
        Some(&FieldValue::from("6f1c2a9e-3b1d-4e0a-9d55-2f7c1e8b0a11"))
    );
    assert_eq!(value.get("status"), Some(&FieldValue::from("PAID")));
    assert_eq!(value.get("checksum"), Some(&FieldValue::Bytes(vec![1, 2, 3, 4])));
    assert_eq!(
        value.get("total"),
        Some(&FieldValue::Decimal(Decimal::new(12345, 2)))
    );
    assert_eq!(
        value.get("placed"),
        Some(&FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()))
    );
    assert_eq!(value.get("coupon"), Some(&FieldValue::Null));
    assert_eq!(
        value.get("attributes"),
        Some(&FieldValue::map([("gift", FieldValue::from(1i64))]))
    );
}
