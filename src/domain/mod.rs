//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the wide and tidy table shapes (`WideSeries`, `TidyRow`)
//! - transform outputs (`AppreciationRecord`, `AppreciationSet`)
//! - geometry and rendering inputs (`RegionGeometry`, `ShadedRegion`)
//! - run configuration (`MapConfig`)

pub mod types;

pub use types::*;
