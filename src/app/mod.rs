// GeoInsert - app/mod.rs
//
// Application layer: batch orchestration.
// Dependencies: core layer. The converter is injected through
// `core::converter::DumpConverter`.

pub mod batch;
