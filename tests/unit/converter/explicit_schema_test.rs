//! Encode/decode with a schema file configured

use crate::unit::common::*;
use apache_avro::Reader;
use std::fs;

#[test]
fn test_dog_round_trip_with_configured_schema() {
    let converter = dog_converter();
    let beamer = dog("Beamer", "Boarder Collie");

    let bytes = converter
        .from_connect_data("dogs", None, &beamer)
        .expect("encode should succeed");
    let decoded = converter
        .to_connect_data("dogs", &bytes)
        .expect("decode should succeed");

    assert_eq!(decoded.schema, dog_schema());
    assert_eq!(
        decoded.value.get("name").and_then(FieldValue::as_str),
        Some("Beamer")
    );
    assert_eq!(
        decoded.value.get("breed").and_then(FieldValue::as_str),
        Some("Boarder Collie")
    );
}

#[test]
fn test_host_schema_is_accepted_alongside_configured_schema() {
    let converter = dog_converter();
    let beamer = dog("Beamer", "Boarder Collie");

    let bytes = converter
        .from_connect_data("dogs", Some(&dog_schema()), &beamer)
        .unwrap();
    assert_eq!(converter.to_connect_data("dogs", &bytes).unwrap().value, beamer);
}

#[test]
fn test_container_embeds_configured_writer_schema() {
    let converter = dog_converter();
    let bytes = converter
        .from_connect_data("dogs", None, &dog("Beamer", "Boarder Collie"))
        .unwrap();

    let reader = Reader::new(&bytes[..]).unwrap();
    let configured = converter.config().unwrap().binary_schema.clone().unwrap();
    assert_eq!(reader.writer_schema(), &configured);
    assert_eq!(reader.count(), 1);
}

#[test]
fn test_configured_schema_is_not_retranslated_per_call() {
    let converter = dog_converter();
    for i in 0..5 {
        let bytes = converter
            .from_connect_data("dogs", None, &dog(&format!("dog-{}", i), "Husky"))
            .unwrap();
        converter.to_connect_data("dogs", &bytes).unwrap();
    }

    let translator = converter.translator().unwrap();
    assert!(translator.binary_cache().is_empty());
    // Only the translation made while configuring
    assert_eq!(translator.structured_cache().stats().misses, 1);
}

#[test]
fn test_missing_required_field_fails_translation() {
    let converter = dog_converter();
    let nameless = FieldValue::structure([("breed", FieldValue::from("Husky"))]);

    let err = converter
        .from_connect_data("dogs", None, &nameless)
        .unwrap_err();
    assert!(err.is_translation());
    assert!(err.to_string().contains("value.name"), "{}", err);
}

#[test]
fn test_reader_schema_fills_defaults_for_new_fields() {
    let (_dir, path) = temp_schema(
        r#"{
            "type": "record",
            "name": "dog",
            "fields": [
                {"name": "name", "type": "string"},
                {"name": "breed", "type": "string"},
                {"name": "owner", "type": "string", "default": "unknown"}
            ]
        }"#,
    );

    let bytes = dog_converter()
        .from_connect_data("dogs", None, &dog("Beamer", "Boarder Collie"))
        .unwrap();

    let evolved = AvroConverter::new();
    evolved
        .configure(&settings_with_schema(&path), false)
        .unwrap();
    let decoded = evolved.to_connect_data("dogs", &bytes).unwrap();

    assert_eq!(decoded.value.get("owner"), Some(&FieldValue::from("unknown")));
    assert_eq!(
        decoded.schema.field("owner").unwrap().schema().default_value(),
        Some(&FieldValue::from("unknown"))
    );
}

#[test]
fn test_empty_container_is_a_deserialization_error() {
    let converter = dog_converter();
    let empty = empty_container(&fs::read_to_string(resource("dog.avsc")).unwrap());

    let err = converter.to_connect_data("dogs", &empty).unwrap_err();
    assert!(matches!(err, ConverterError::Deserialization { .. }));
    assert!(err.to_string().contains("topic dogs"), "{}", err);
    assert!(err.to_string().contains("no records"), "{}", err);
}

#[test]
fn test_truncated_container_is_a_deserialization_error() {
    let converter = dog_converter();
    let bytes = converter
        .from_connect_data("dogs", None, &dog("Beamer", "Boarder Collie"))
        .unwrap();

    let err = converter
        .to_connect_data("dogs", &bytes[..bytes.len() / 2])
        .unwrap_err();
    assert!(matches!(err, ConverterError::Deserialization { .. }));
}
