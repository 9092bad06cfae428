// One configured converter shared by worker threads

use crate::unit::common::*;
use std::sync::Arc;
use std::thread;

const WORKERS: usize = 8;
const RECORDS_PER_WORKER: usize = 25;

#[test]
fn test_shared_strict_converter() {
    let converter = Arc::new(dog_converter());

    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let converter = Arc::clone(&converter);
            thread::spawn(move || {
                for i in 0..RECORDS_PER_WORKER {
                    let value = dog(&format!("dog-{}-{}", worker, i), "Beagle");
                    let bytes = converter.from_connect_data("dogs", None, &value).unwrap();
                    let decoded = converter.to_connect_data("dogs", &bytes).unwrap();
                    assert_eq!(decoded.value, value);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }
}

#[test]
fn test_shared_permissive_converter_with_mixed_schemas() {
    let converter = Arc::new(schemaless_converter());

    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let converter = Arc::clone(&converter);
            thread::spawn(move || {
                // Each worker alternates between a shared schema and its own
                let own_schema = SchemaBuilder::structure()
                    .name(format!("worker{}", worker))
                    .field("seq", Schema::int64())
                    .build();
                for i in 0..RECORDS_PER_WORKER {
                    let (schema, value) = if i % 2 == 0 {
                        (dog_schema(), dog("Rex", "Boxer"))
                    } else {
                        (
                            own_schema.clone(),
                            FieldValue::structure([("seq", FieldValue::from(i as i64))]),
                        )
                    };
                    let bytes = converter
                        .from_connect_data("mixed", Some(&schema), &value)
                        .unwrap();
                    let decoded = converter.to_connect_data("mixed", &bytes).unwrap();
                    assert_eq!(decoded.schema, schema);
                    assert_eq!(decoded.value, value);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }

    // One shared schema plus one per worker, all within the default capacity
    let cache = converter.translator().unwrap().binary_cache();
    assert_eq!(cache.len(), WORKERS + 1);
}
