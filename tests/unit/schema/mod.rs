pub mod avsc_translation_test;
pub mod connect_metadata_test;
