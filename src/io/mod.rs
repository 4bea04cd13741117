//! Input/output helpers.
//!
//! - wide CSV ingest (`ingest`)
//! - GeoJSON parsing and export (`geojson`)
//! - appreciation CSV export (`export`)

pub mod export;
pub mod geojson;
pub mod ingest;

pub use export::*;
pub use geojson::*;
pub use ingest::*;
