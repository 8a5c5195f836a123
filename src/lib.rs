// GeoInsert - lib.rs
//
// Library entry point, exposing all modules for integration testing
// and programmatic use (e.g. embedding the batch in another tool with a
// custom progress callback).

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
