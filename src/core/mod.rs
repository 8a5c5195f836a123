// GeoInsert - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: platform, app.

pub mod converter;
pub mod discovery;
pub mod filter;
pub mod model;
pub mod naming;
pub mod report;
