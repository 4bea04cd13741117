//! Shared domain types.
//!
//! These types are plain values: every pipeline step consumes them immutably and
//! produces new ones. Most are serializable so they can be exported to CSV/GeoJSON
//! or embedded in a rendered map.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// What to do when a region's baseline value is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ZeroBaselinePolicy {
    /// Exclude the region, log a warning, and record it as skipped.
    #[default]
    Skip,
    /// Abort the whole transform with `DivisionByZero`.
    Fail,
}

/// Boundary resolution requested from the geometry provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Resolution {
    #[serde(rename = "500k")]
    #[value(name = "500k")]
    R500k,
    #[serde(rename = "5m")]
    #[value(name = "5m")]
    R5m,
    #[serde(rename = "20m")]
    #[value(name = "20m")]
    R20m,
}

impl Resolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::R500k => "500k",
            Resolution::R5m => "5m",
            Resolution::R20m => "20m",
        }
    }
}

/// Row order requested from the time-series provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
        }
    }
}

/// One dated row of a [`WideSeries`]; `values[i]` belongs to `regions[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

/// A wide time-indexed table: one row per date, one column per region.
///
/// Row order carries no meaning; lookups are always by date value.
#[derive(Debug, Clone, PartialEq)]
pub struct WideSeries {
    date_column: String,
    regions: Vec<String>,
    rows: Vec<WideRow>,
}

impl WideSeries {
    /// Build a series, rejecting duplicate column names and ragged rows.
    pub fn new(
        date_column: impl Into<String>,
        regions: Vec<String>,
        rows: Vec<WideRow>,
    ) -> Result<Self, TransformError> {
        let date_column = date_column.into();
        let mut seen = HashSet::with_capacity(regions.len() + 1);
        seen.insert(date_column.as_str());
        for region in &regions {
            if !seen.insert(region.as_str()) {
                return Err(TransformError::InvalidSeries(format!(
                    "duplicate column name '{region}'"
                )));
            }
        }

        for row in &rows {
            if row.values.len() != regions.len() {
                return Err(TransformError::InvalidSeries(format!(
                    "row {} has {} values but {} region columns",
                    row.date,
                    row.values.len(),
                    regions.len()
                )));
            }
        }

        Ok(Self {
            date_column,
            regions,
            rows,
        })
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn rows(&self) -> &[WideRow] {
        &self.rows
    }

    /// Drop the last `n` region columns (provider metadata, not regions).
    ///
    /// Dropping more columns than exist leaves an empty region list.
    pub fn drop_trailing_columns(mut self, n: usize) -> Self {
        let keep = self.regions.len().saturating_sub(n);
        self.regions.truncate(keep);
        for row in &mut self.rows {
            row.values.truncate(keep);
        }
        self
    }

    /// Sorted, de-duplicated dates present in the series.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.rows.iter().map(|r| r.date).collect();
        dates.sort();
        dates.dedup();
        dates
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|r| r.date).max()
    }
}

/// One long-format observation.
#[derive(Debug, Clone, PartialEq)]
pub struct TidyRow {
    pub region: String,
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Percent appreciation for one region between the baseline and current dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppreciationRecord {
    pub region: String,
    pub appreciation: f64,
}

/// Why a region did not produce an [`AppreciationRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingBaseline,
    MissingCurrent,
    NullValue,
    DuplicateDate,
    ZeroBaseline,
    NonFinite,
}

impl SkipReason {
    pub fn label(self) -> &'static str {
        match self {
            SkipReason::MissingBaseline => "missing baseline date",
            SkipReason::MissingCurrent => "missing current date",
            SkipReason::NullValue => "null value",
            SkipReason::DuplicateDate => "duplicate date rows",
            SkipReason::ZeroBaseline => "zero baseline",
            SkipReason::NonFinite => "non-finite result",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRegion {
    pub region: String,
    pub reason: SkipReason,
}

/// Transform output: one record per fully computed region.
///
/// `records` and `skipped` are sorted by region; build through [`AppreciationSet::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppreciationSet {
    pub baseline: NaiveDate,
    pub current: NaiveDate,
    pub records: Vec<AppreciationRecord>,
    pub skipped: Vec<SkippedRegion>,
}

impl AppreciationSet {
    pub fn new(
        baseline: NaiveDate,
        current: NaiveDate,
        mut records: Vec<AppreciationRecord>,
        mut skipped: Vec<SkippedRegion>,
    ) -> Self {
        records.sort_by(|a, b| a.region.cmp(&b.region));
        skipped.sort_by(|a, b| a.region.cmp(&b.region));
        Self {
            baseline,
            current,
            records,
            skipped,
        }
    }

    pub fn get(&self, region: &str) -> Option<f64> {
        debug_assert!(
            self.records.is_sorted_by(|a, b| a.region <= b.region),
            "records must be sorted by region"
        );
        self.records
            .binary_search_by(|r| r.region.as_str().cmp(region))
            .ok()
            .map(|idx| self.records[idx].appreciation)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A region boundary as delivered by the geometry provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGeometry {
    /// Join key value (e.g. `STUSPS` = "CA").
    pub code: String,
    /// Display name (e.g. "California").
    pub name: String,
    /// GeoJSON geometry object.
    pub geometry: serde_json::Value,
}

/// A geometry joined with its appreciation (if any), ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadedRegion {
    pub code: String,
    pub name: String,
    pub geometry: serde_json::Value,
    pub appreciation: Option<f64>,
}

/// Where to read the region geometries from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometrySource {
    File(PathBuf),
    /// URL template; `{resolution}` and `{kind}` are substituted.
    Url(String),
}

impl GeometrySource {
    /// Interpret a CLI value: `http(s)://` means URL, anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            GeometrySource::Url(trimmed.to_string())
        } else {
            GeometrySource::File(PathBuf::from(trimmed))
        }
    }
}

/// Output artifacts requested for a run.
#[derive(Debug, Clone, Default)]
pub struct OutputPaths {
    pub html: Option<PathBuf>,
    pub svg: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
    pub export_geojson: Option<PathBuf>,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `.env`).
#[derive(Debug, Clone)]
pub struct MapConfig {
    pub dataset_code: String,
    /// Read the series from this CSV instead of the provider.
    pub series_csv: Option<PathBuf>,
    pub baseline: Option<NaiveDate>,
    pub current: Option<NaiveDate>,
    /// Trailing provider columns that are metadata, not regions.
    pub metadata_columns: usize,
    pub zero_baseline: ZeroBaselinePolicy,
    pub timeout_secs: u64,
    pub top_n: usize,

    pub geometry: Option<GeometrySource>,
    pub resolution: Resolution,
    pub cartographic: bool,
    /// Feature property holding the join key.
    pub join_key: String,
    /// Feature property holding the display name.
    pub name_field: String,

    pub outputs: OutputPaths,
    pub svg_width: u32,
    pub svg_height: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            dataset_code: "FMAC/HPI".to_string(),
            series_csv: None,
            baseline: None,
            current: None,
            metadata_columns: 2,
            zero_baseline: ZeroBaselinePolicy::Skip,
            timeout_secs: 30,
            top_n: 10,
            geometry: None,
            resolution: Resolution::R20m,
            cartographic: true,
            join_key: "STUSPS".to_string(),
            name_field: "NAME".to_string(),
            outputs: OutputPaths::default(),
            svg_width: 1200,
            svg_height: 700,
        }
    }
}
