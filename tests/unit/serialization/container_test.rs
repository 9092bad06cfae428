// Container layout of encoded documents

use crate::unit::common::*;
use apache_avro::types::Value as AvroValue;
use apache_avro::{Codec, Reader, Schema as AvroSchema, Writer};
use registryless_avro::registryless::serialization::AvroContainerCodec;
use std::fs;

fn dog_avro_schema() -> AvroSchema {
    AvroSchema::parse_str(&fs::read_to_string(resource("dog.avsc")).unwrap()).unwrap()
}

fn dog_record(name: &str) -> AvroValue {
    AvroValue::Record(vec![
        ("name".into(), AvroValue::String(name.into())),
        ("breed".into(), AvroValue::String("Collie".into())),
    ])
}

#[test]
fn test_document_holds_exactly_one_record() {
    let converter = schemaless_converter();
    let bytes = converter
        .from_connect_data("dogs", Some(&dog_schema()), &dog("Beamer", "Border Collie"))
        .unwrap();

    assert_eq!(&bytes[..4], b"Obj\x01");
    let reader = Reader::new(&bytes[..]).unwrap();
    assert_eq!(reader.count(), 1);
}

#[test]
fn test_document_embeds_translated_writer_schema() {
    let converter = schemaless_converter();
    let bytes = converter
        .from_connect_data("dogs", Some(&dog_schema()), &dog("Beamer", "Border Collie"))
        .unwrap();

    let reader = Reader::new(&bytes[..]).unwrap();
    let writer_schema = serde_json::to_value(reader.writer_schema()).unwrap();
    assert_eq!(writer_schema["type"], "record");
    assert_eq!(writer_schema["name"], "dog");
    assert_eq!(writer_schema["connect.name"], "dog");
}

#[test]
fn test_decoder_uses_first_of_several_records() {
    let schema = dog_avro_schema();
    let mut writer = Writer::with_codec(&schema, Vec::new(), Codec::Null);
    writer.append(dog_record("first")).unwrap();
    writer.append(dog_record("second")).unwrap();
    let bytes = writer.into_inner().unwrap();

    let record = AvroContainerCodec::new("dogs").decode(&bytes, None).unwrap();
    assert_eq!(record.value, dog_record("first"));
    assert_eq!(record.writer_schema, schema);
}

#[test]
fn test_deflate_containers_are_readable() {
    let schema = dog_avro_schema();
    let mut writer = Writer::with_codec(&schema, Vec::new(), Codec::Deflate);
    writer.append(dog_record("Rex")).unwrap();
    let bytes = writer.into_inner().unwrap();

    let converter = schemaless_converter();
    let decoded = converter.to_connect_data("dogs", &bytes).unwrap();
    assert_eq!(decoded.value, dog("Rex", "Collie"));
}

#[test]
fn test_empty_container_reports_topic() {
    let empty = empty_container(&fs::read_to_string(resource("dog.avsc")).unwrap());
    let err = AvroContainerCodec::new("kennel")
        .decode(&empty, None)
        .unwrap_err();

    assert!(matches!(err, ConverterError::Deserialization { .. }));
    assert!(err.to_string().contains("kennel"), "{}", err);
}
