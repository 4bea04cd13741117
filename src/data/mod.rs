//! External data providers.
//!
//! The pipeline only sees two narrow traits:
//!
//! - [`SeriesProvider`]: fetch a wide time series by dataset code
//! - [`GeometryProvider`]: fetch region boundaries by resolution flags
//!
//! HTTP implementations talk to Nasdaq Data Link and a GeoJSON endpoint; file
//! implementations read the same shapes from disk so runs can be reproduced
//! offline and tested with fixtures.

pub mod geometry;
pub mod nasdaq;

use std::path::PathBuf;

use crate::domain::{RegionGeometry, Resolution, SortOrder, WideSeries};
use crate::error::ProviderError;

pub use geometry::{GeoJsonFileProvider, GeoJsonUrlProvider};
pub use nasdaq::NasdaqClient;

/// A request for one time-series dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub dataset_code: String,
    pub order: SortOrder,
}

impl SeriesRequest {
    pub fn ascending(dataset_code: impl Into<String>) -> Self {
        Self {
            dataset_code: dataset_code.into(),
            order: SortOrder::Asc,
        }
    }
}

/// A request for region boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryRequest {
    pub resolution: Resolution,
    /// Cartographic (coastline-clipped) boundaries rather than full TIGER shapes.
    pub cartographic: bool,
}

impl GeometryRequest {
    /// Token substituted for `{kind}` in URL templates.
    pub fn kind(&self) -> &'static str {
        if self.cartographic { "cb" } else { "tiger" }
    }
}

pub trait SeriesProvider {
    fn fetch_series(&self, request: &SeriesRequest) -> Result<WideSeries, ProviderError>;
}

pub trait GeometryProvider {
    fn fetch_geometries(&self, request: &GeometryRequest) -> Result<Vec<RegionGeometry>, ProviderError>;
}

/// Reads a wide series from a local CSV (`Date,<region>,<region>,...`).
///
/// The dataset code is ignored; the file *is* the dataset.
#[derive(Debug, Clone)]
pub struct CsvSeriesProvider {
    path: PathBuf,
}

impl CsvSeriesProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SeriesProvider for CsvSeriesProvider {
    fn fetch_series(&self, _request: &SeriesRequest) -> Result<WideSeries, ProviderError> {
        crate::io::ingest::load_wide_csv(&self.path)
    }
}
