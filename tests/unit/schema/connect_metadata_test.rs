// Connect metadata carried through Avro schema attributes

use crate::unit::common::*;
use registryless_avro::registryless::schema::{DEFAULT_CACHE_SIZE, SchemaTranslator};

fn gauge_schema() -> Schema {
    SchemaBuilder::structure()
        .name("com.example.Gauge")
        .version(3)
        .doc("Panel gauge")
        .parameter("owner", "ops")
        .field("level", Schema::int8())
        .field(
            "label",
            SchemaBuilder::new(SchemaType::String)
                .doc("Display label")
                .parameter("max.length", "16")
                .build(),
        )
        .field(
            "history",
            SchemaBuilder::array(SchemaBuilder::new(SchemaType::Int16).optional().build()).build(),
        )
        .field(
            "limits",
            SchemaBuilder::map(Schema::string(), Schema::int8())
                .optional()
                .build(),
        )
        .build()
}

#[test]
fn test_metadata_is_written_as_attributes() {
    let translator = SchemaTranslator::default();
    let avro = translator.to_binary_schema(&gauge_schema()).unwrap();
    let json = serde_json::to_value(&avro).unwrap();

    assert_eq!(json["connect.name"], "com.example.Gauge");
    assert_eq!(json["connect.version"], 3);
    assert_eq!(json["connect.parameters"]["owner"], "ops");
    assert_eq!(json["doc"], "Panel gauge");

    let fields = json["fields"].as_array().unwrap();
    assert_eq!(fields[0]["type"], "int");
    assert_eq!(fields[0]["connect.type"], "int8");
    assert_eq!(fields[1]["connect.doc"], "Display label");
    assert_eq!(fields[1]["connect.parameters"]["max.length"], "16");
    assert_eq!(fields[2]["type"]["connect.items"]["connect.type"], "int16");
}

#[test]
fn test_metadata_round_trip() {
    let translator = SchemaTranslator::default();
    let avro = translator.to_binary_schema(&gauge_schema()).unwrap();
    assert_eq!(translator.to_structured_schema(&avro).unwrap(), gauge_schema());
}

#[test]
fn test_metadata_survives_container_round_trip() {
    let converter = schemaless_converter();
    let value = FieldValue::structure([
        ("level", FieldValue::Int8(7)),
        ("label", FieldValue::from("boiler")),
        (
            "history",
            FieldValue::Array(vec![FieldValue::Int16(-2), FieldValue::Null]),
        ),
        ("limits", FieldValue::map([("high", FieldValue::Int8(9))])),
    ]);

    let bytes = converter
        .from_connect_data("gauges", Some(&gauge_schema()), &value)
        .unwrap();
    let decoded = converter.to_connect_data("gauges", &bytes).unwrap();

    assert_eq!(decoded.schema, gauge_schema());
    assert_eq!(decoded.value, value);
}

#[test]
fn test_disabled_metadata_emits_no_connect_attributes() {
    let translator = SchemaTranslator::new(DEFAULT_CACHE_SIZE, false);
    let avro = translator.to_binary_schema(&gauge_schema()).unwrap();
    let text = serde_json::to_string(&avro).unwrap();
    assert!(!text.contains("connect."), "{}", text);

    let back = translator.to_structured_schema(&avro).unwrap();
    assert_eq!(back.name(), Some("com.example.Gauge"));
    assert_eq!(back.version(), None);
    assert_eq!(
        back.field("level").unwrap().schema().schema_type(),
        SchemaType::Int32
    );
}

#[test]
fn test_converter_honours_metadata_setting() {
    let converter = AvroConverter::permissive();
    converter
        .configure(
            &ConverterSettings::new().with("connect.meta.data", false),
            false,
        )
        .unwrap();

    let value = FieldValue::structure([("level", FieldValue::Int8(7))]);
    let schema = SchemaBuilder::structure()
        .name("tiny")
        .field("level", Schema::int8())
        .build();

    let bytes = converter
        .from_connect_data("tiny", Some(&schema), &value)
        .unwrap();
    let decoded = converter.to_connect_data("tiny", &bytes).unwrap();
    assert_eq!(decoded.value.get("level"), Some(&FieldValue::Int32(7)));
}

#[test]
fn test_top_level_primitive_metadata_has_no_host() {
    let translator = SchemaTranslator::default();
    let avro = translator.to_binary_schema(&Schema::int8()).unwrap();
    let back = translator.to_structured_schema(&avro).unwrap();
    assert_eq!(back.schema_type(), SchemaType::Int32);
}
