//! FILENAME: src/ipc/handlers/mod.rs
// PURPOSE: Channel handlers, grouped by feature.

pub mod test;

pub use test::register_test_handlers;
