pub mod container_test;
