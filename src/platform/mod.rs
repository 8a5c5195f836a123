// GeoInsert - platform/mod.rs
//
// Platform abstraction layer: config directories, config.toml and the
// ogr2ogr subprocess.
// Dependencies: core model types, directories crate.

pub mod config;
pub mod ogr;
