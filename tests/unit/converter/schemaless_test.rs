// Permissive converter tests: schemas derived per record, no schema file

use crate::unit::common::*;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

fn reading_schema() -> Schema {
    let location = SchemaBuilder::structure()
        .name("com.example.Location")
        .field("lat", Schema::float64())
        .field("lon", Schema::float64())
        .build();

    SchemaBuilder::structure()
        .name("com.example.Reading")
        .doc("One sensor reading")
        .field("sensor", Schema::string())
        .field("level", Schema::int8())
        .field("channel", SchemaBuilder::new(SchemaType::Int16).optional().build())
        .field("location", location)
        .field("samples", SchemaBuilder::array(Schema::int32()).build())
        .field(
            "tags",
            SchemaBuilder::map(Schema::string(), Schema::string()).build(),
        )
        .field("note", Schema::optional_string())
        .build()
}

fn reading() -> FieldValue {
    FieldValue::structure([
        ("sensor", FieldValue::from("t-100")),
        ("level", FieldValue::Int8(-3)),
        ("channel", FieldValue::Null),
        (
            "location",
            FieldValue::structure([
                ("lat", FieldValue::from(52.37)),
                ("lon", FieldValue::from(4.89)),
            ]),
        ),
        (
            "samples",
            FieldValue::Array(vec![FieldValue::from(1), FieldValue::from(2)]),
        ),
        (
            "tags",
            FieldValue::map([("site", FieldValue::from("north"))]),
        ),
        ("note", FieldValue::from("recalibrated")),
    ])
}

#[test]
fn test_nested_record_round_trip() {
    let converter = schemaless_converter();

    let bytes = converter
        .from_connect_data("readings", Some(&reading_schema()), &reading())
        .unwrap();
    let decoded = converter.to_connect_data("readings", &bytes).unwrap();

    assert_eq!(decoded.schema, reading_schema());
    assert_eq!(decoded.value, reading());
}

#[test]
fn test_inferred_schema_round_trip() {
    let converter = schemaless_converter();
    let value = dog("Beamer", "Border Collie");

    let bytes = converter.from_connect_data("dogs", None, &value).unwrap();
    let decoded = converter.to_connect_data("dogs", &bytes).unwrap();

    assert_eq!(decoded.value, value);
    assert_eq!(decoded.schema.name(), None);
    assert_eq!(decoded.schema.schema_type(), SchemaType::Struct);
}

#[test]
fn test_logical_types_round_trip() {
    let converter = schemaless_converter();
    let schema = SchemaBuilder::structure()
        .name("trade")
        .field("price", LogicalType::decimal(2).build())
        .field("settle", LogicalType::date().build())
        .field("cutoff", LogicalType::time().build())
        .field("executed", LogicalType::timestamp().build())
        .build();
    let settle = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let value = FieldValue::structure([
        ("price", FieldValue::Decimal(Decimal::new(1999, 2))),
        ("settle", FieldValue::Date(settle)),
        (
            "cutoff",
            FieldValue::Time(NaiveTime::from_hms_milli_opt(16, 30, 0, 250).unwrap()),
        ),
        (
            "executed",
            FieldValue::Timestamp(settle.and_hms_milli_opt(9, 15, 30, 125).unwrap()),
        ),
    ]);

    let bytes = converter
        .from_connect_data("trades", Some(&schema), &value)
        .unwrap();
    let decoded = converter.to_connect_data("trades", &bytes).unwrap();

    assert_eq!(decoded.schema, schema);
    assert_eq!(decoded.value, value);
    assert_eq!(
        decoded.value.get("price"),
        Some(&FieldValue::Decimal(Decimal::new(1999, 2)))
    );
}

#[test]
fn test_negative_decimal_round_trip() {
    let converter = schemaless_converter();
    let value = FieldValue::structure([("delta", FieldValue::Decimal(Decimal::new(-12345, 3)))]);

    let bytes = converter.from_connect_data("deltas", None, &value).unwrap();
    let decoded = converter.to_connect_data("deltas", &bytes).unwrap();
    assert_eq!(decoded.value, value);
}

#[test]
fn test_non_string_map_keys_fail_translation() {
    let converter = schemaless_converter();
    let schema = SchemaBuilder::structure()
        .name("lookup")
        .field(
            "by_id",
            SchemaBuilder::map(Schema::int32(), Schema::string()).build(),
        )
        .build();
    let value = FieldValue::structure([("by_id", FieldValue::map([("1", FieldValue::from("a"))]))]);

    let err = converter
        .from_connect_data("lookups", Some(&schema), &value)
        .unwrap_err();
    assert!(err.is_translation(), "{}", err);
    assert!(err.to_string().contains("STRING keys"), "{}", err);
}

#[test]
fn test_null_field_cannot_be_inferred() {
    let converter = schemaless_converter();
    let value = FieldValue::structure([
        ("name", FieldValue::from("Beamer")),
        ("owner", FieldValue::Null),
    ]);

    let err = converter.from_connect_data("dogs", None, &value).unwrap_err();
    assert!(err.is_translation(), "{}", err);
    assert!(err.to_string().contains("owner"), "{}", err);
}

#[test]
fn test_translation_cache_is_bounded() {
    let converter = AvroConverter::permissive();
    converter
        .configure(
            &ConverterSettings::new().with("schema.cache.size", 2i64),
            false,
        )
        .unwrap();

    let schemas: Vec<Schema> = ["a", "b", "c"]
        .iter()
        .map(|field| {
            SchemaBuilder::structure()
                .name("counter")
                .field(*field, Schema::int32())
                .build()
        })
        .collect();
    let values: Vec<FieldValue> = ["a", "b", "c"]
        .iter()
        .map(|field| FieldValue::structure([(*field, FieldValue::from(7))]))
        .collect();

    for (schema, value) in schemas.iter().zip(&values) {
        converter
            .from_connect_data("counters", Some(schema), value)
            .unwrap();
    }

    let cache = converter.translator().unwrap().binary_cache();
    assert_eq!(cache.capacity(), 2);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().evictions, 1);

    // The evicted schema is translated again and still encodes correctly
    let bytes = converter
        .from_connect_data("counters", Some(&schemas[0]), &values[0])
        .unwrap();
    let decoded = converter.to_connect_data("counters", &bytes).unwrap();
    assert_eq!(decoded.schema, schemas[0]);
    assert_eq!(decoded.value, values[0]);
    assert_eq!(cache.stats().misses, 4);
}

#[test]
fn test_repeated_schema_hits_cache() {
    let converter = schemaless_converter();
    for name in ["Beamer", "Lassie", "Rex"] {
        converter
            .from_connect_data("dogs", Some(&dog_schema()), &dog(name, "Collie"))
            .unwrap();
    }

    let stats = converter.translator().unwrap().binary_cache().stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);
}

#[test]
fn test_decimal_exceeding_precision_is_rejected() {
    let converter = schemaless_converter();
    let schema = SchemaBuilder::structure()
        .name("invoice")
        .field(
            "amount",
            LogicalType::decimal(2)
                .parameter("connect.decimal.precision", "3")
                .build(),
        )
        .build();
    let value = FieldValue::structure([(
        "amount",
        FieldValue::Decimal(Decimal::new(123_456_789, 2)),
    )]);

    let err = converter
        .from_connect_data("invoices", Some(&schema), &value)
        .unwrap_err();
    assert!(err.is_translation(), "{}", err);
    assert!(err.to_string().contains("value.amount"), "{}", err);
    assert!(err.to_string().contains("precision 3"), "{}", err);

    let fits = FieldValue::structure([("amount", FieldValue::Decimal(Decimal::new(999, 2)))]);
    let bytes = converter
        .from_connect_data("invoices", Some(&schema), &fits)
        .unwrap();
    let decoded = converter.to_connect_data("invoices", &bytes).unwrap();
    assert_eq!(decoded.value, fits);
}

#[test]
fn test_sub_millisecond_temporal_values_are_rejected() {
    let converter = schemaless_converter();
    let schema = SchemaBuilder::structure()
        .name("event")
        .field("at", LogicalType::time().build())
        .build();

    let micros = FieldValue::structure([(
        "at",
        FieldValue::Time(NaiveTime::from_hms_micro_opt(1, 2, 3, 456_789).unwrap()),
    )]);
    let err = converter
        .from_connect_data("events", Some(&schema), &micros)
        .unwrap_err();
    assert!(err.is_translation(), "{}", err);
    assert!(err.to_string().contains("value.at"), "{}", err);

    let stamp = FieldValue::structure([(
        "at",
        FieldValue::Timestamp(
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_micro_opt(9, 15, 30, 125_001)
                .unwrap(),
        ),
    )]);
    let timestamp_schema = SchemaBuilder::structure()
        .name("event")
        .field("at", LogicalType::timestamp().build())
        .build();
    assert!(
        converter
            .from_connect_data("events", Some(&timestamp_schema), &stamp)
            .unwrap_err()
            .is_translation()
    );

    // Whole milliseconds survive exactly
    let millis = FieldValue::structure([(
        "at",
        FieldValue::Time(NaiveTime::from_hms_milli_opt(1, 2, 3, 456).unwrap()),
    )]);
    let bytes = converter
        .from_connect_data("events", Some(&schema), &millis)
        .unwrap();
    assert_eq!(converter.to_connect_data("events", &bytes).unwrap().value, millis);
}
