//! Shared pipeline used by every subcommand.
//!
//! fetch series -> trim metadata columns -> resolve dates -> appreciation
//! -> (fetch geometries -> left join -> color scale)
//!
//! Providers are passed in as trait objects so tests can drive the whole flow
//! with in-memory fakes.

use std::time::Duration;

use chrono::NaiveDate;
use tracing::info;

use crate::data::geometry::FeatureFields;
use crate::data::{
    CsvSeriesProvider, GeoJsonFileProvider, GeoJsonUrlProvider, GeometryProvider, GeometryRequest, NasdaqClient,
    SeriesProvider, SeriesRequest,
};
use crate::domain::{AppreciationSet, GeometrySource, MapConfig, ShadedRegion, WideSeries};
use crate::error::{AppError, TransformError};
use crate::join::{JoinSummary, left_join};
use crate::render::{ColorScale, appreciation_scale};
use crate::report::{Rankings, rank_appreciation};
use crate::transform::{default_date_pair, year_before};

/// Outputs of the transform-only pipeline (`hpa rank`).
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub set: AppreciationSet,
    pub rankings: Rankings,
}

/// All computed outputs of a single `hpa map` run.
#[derive(Debug, Clone)]
pub struct MapOutput {
    pub set: AppreciationSet,
    pub rankings: Rankings,
    pub regions: Vec<ShadedRegion>,
    pub join: JoinSummary,
    pub scale: ColorScale,
}

/// Build the series provider the config asks for: a local CSV, else Nasdaq Data Link.
pub fn series_provider(config: &MapConfig) -> Result<Box<dyn SeriesProvider>, AppError> {
    match &config.series_csv {
        Some(path) => Ok(Box::new(CsvSeriesProvider::new(path.clone()))),
        None => Ok(Box::new(NasdaqClient::from_env(timeout(config))?)),
    }
}

/// Build the geometry provider for `--geometry`.
pub fn geometry_provider(config: &MapConfig) -> Result<Box<dyn GeometryProvider>, AppError> {
    let fields = FeatureFields {
        join_key: config.join_key.clone(),
        name: config.name_field.clone(),
    };
    match &config.geometry {
        Some(GeometrySource::File(path)) => Ok(Box::new(GeoJsonFileProvider::new(path.clone(), fields))),
        Some(GeometrySource::Url(template)) => {
            Ok(Box::new(GeoJsonUrlProvider::new(template.clone(), fields, timeout(config))?))
        }
        None => Err(AppError::new(2, "No geometry source given (use --geometry <path|url>).")),
    }
}

fn timeout(config: &MapConfig) -> Duration {
    Duration::from_secs(config.timeout_secs.max(1))
}

/// Fetch the series and drop the trailing metadata columns.
pub fn load_series(config: &MapConfig, provider: &dyn SeriesProvider) -> Result<WideSeries, AppError> {
    let request = SeriesRequest::ascending(config.dataset_code.clone());
    let series = provider.fetch_series(&request)?;
    info!(
        dataset = %config.dataset_code,
        rows = series.rows().len(),
        columns = series.regions().len(),
        "fetched series"
    );
    Ok(series.drop_trailing_columns(config.metadata_columns))
}

/// Resolve the baseline/current pair from the config, filling gaps from the series.
///
/// - neither given: latest date and twelve months before it
/// - only `current`: twelve months before `current`
/// - only `baseline`: latest date in the series
pub fn resolve_dates(config: &MapConfig, series: &WideSeries) -> Result<(NaiveDate, NaiveDate), AppError> {
    let empty = || TransformError::InvalidSeries("series has no date rows".to_string());

    let pair = match (config.baseline, config.current) {
        (Some(baseline), Some(current)) => (baseline, current),
        (None, None) => default_date_pair(series).ok_or_else(empty)?,
        (Some(baseline), None) => (baseline, series.latest_date().ok_or_else(empty)?),
        (None, Some(current)) => {
            let baseline = year_before(current).ok_or_else(|| {
                AppError::new(2, format!("Cannot derive a baseline twelve months before {current}."))
            })?;
            (baseline, current)
        }
    };
    Ok(pair)
}

/// Transform-only pipeline.
pub fn run_transform(config: &MapConfig, provider: &dyn SeriesProvider) -> Result<TransformOutput, AppError> {
    let series = load_series(config, provider)?;
    let (baseline, current) = resolve_dates(config, &series)?;

    let set = crate::transform::appreciation(&series, baseline, current, config.zero_baseline)?;
    info!(
        %baseline,
        %current,
        computed = set.records.len(),
        skipped = set.skipped.len(),
        "computed appreciation"
    );

    let rankings = rank_appreciation(&set, config.top_n);
    Ok(TransformOutput { set, rankings })
}

/// Full map pipeline: transform, fetch geometries, join, build the color scale.
pub fn run_map(
    config: &MapConfig,
    series_provider: &dyn SeriesProvider,
    geometry_provider: &dyn GeometryProvider,
) -> Result<MapOutput, AppError> {
    let TransformOutput { set, rankings } = run_transform(config, series_provider)?;

    let request = GeometryRequest {
        resolution: config.resolution,
        cartographic: config.cartographic,
    };
    let geometries = geometry_provider.fetch_geometries(&request)?;
    info!(features = geometries.len(), resolution = request.resolution.as_str(), "fetched geometries");

    let (regions, join) = left_join(&geometries, &set);
    info!(
        matched = join.matched,
        no_data = join.unmatched_geometries.len(),
        no_geometry = join.orphan_regions.len(),
        "joined appreciation onto geometries"
    );

    let scale = appreciation_scale(&regions);

    Ok(MapOutput {
        set,
        rankings,
        regions,
        join,
        scale,
    })
}
