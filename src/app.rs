//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - builds the series/geometry providers
//! - runs the appreciation pipeline
//! - prints reports and writes the map and export files

use clap::Parser;
use tracing::info;

use crate::cli::{Command, MapArgs, SeriesArgs};
use crate::domain::{GeometrySource, MapConfig, OutputPaths};
use crate::error::AppError;
use crate::render::{HtmlMapRenderer, MapRenderer, SvgMapRenderer, popup_text};

pub mod pipeline;

/// Entry point for the `hpa` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init_tracing(cli.log_json);

    match cli.command {
        Command::Map(args) => handle_map(args),
        Command::Rank(args) => handle_rank(args),
        Command::Dates(args) => handle_dates(args),
    }
}

fn handle_map(args: MapArgs) -> Result<(), AppError> {
    let config = map_config_from_args(&args);
    let series_provider = pipeline::series_provider(&config)?;
    let geometry_provider = pipeline::geometry_provider(&config)?;
    let run = pipeline::run_map(&config, series_provider.as_ref(), geometry_provider.as_ref())?;

    println!(
        "{}",
        crate::report::format_summary(&config.dataset_code, &run.set, Some(&run.join), Some(&run.scale))
    );
    println!("{}", crate::report::format_rankings(&run.rankings));

    let title = format!("House price appreciation {} to {}", run.set.baseline, run.set.current);

    if let Some(path) = &config.outputs.html {
        let renderer = HtmlMapRenderer {
            path: path.clone(),
            title,
            join_key: config.join_key.clone(),
            name_field: config.name_field.clone(),
        };
        renderer.render(&run.regions, &run.scale, &popup_text)?;
        info!(path = %path.display(), "wrote HTML map");
    }
    if let Some(path) = &config.outputs.svg {
        let renderer = SvgMapRenderer {
            path: path.clone(),
            width: config.svg_width,
            height: config.svg_height,
        };
        renderer.render(&run.regions, &run.scale, &popup_text)?;
        info!(path = %path.display(), "wrote SVG map");
    }

    // Optional exports.
    if let Some(path) = &config.outputs.export_csv {
        crate::io::export::write_appreciation_csv(path, &run.set, &config.join_key)?;
    }
    if let Some(path) = &config.outputs.export_geojson {
        crate::io::geojson::write_shaded_geojson(path, &run.regions, &config.join_key, &config.name_field)?;
    }

    Ok(())
}

fn handle_rank(args: SeriesArgs) -> Result<(), AppError> {
    let config = series_config_from_args(&args);
    let provider = pipeline::series_provider(&config)?;
    let run = pipeline::run_transform(&config, provider.as_ref())?;

    println!("{}", crate::report::format_summary(&config.dataset_code, &run.set, None, None));
    println!("{}", crate::report::format_rankings(&run.rankings));

    if let Some(path) = &config.outputs.export_csv {
        crate::io::export::write_appreciation_csv(path, &run.set, &config.join_key)?;
    }
    Ok(())
}

fn handle_dates(args: SeriesArgs) -> Result<(), AppError> {
    let config = series_config_from_args(&args);
    let provider = pipeline::series_provider(&config)?;
    let series = pipeline::load_series(&config, provider.as_ref())?;

    print!("{}", crate::report::format_dates(&series.dates()));
    Ok(())
}

/// Config for subcommands that only need the series.
pub fn series_config_from_args(args: &SeriesArgs) -> MapConfig {
    MapConfig {
        dataset_code: args.dataset.clone(),
        series_csv: args.series_csv.clone(),
        baseline: args.baseline,
        current: args.current,
        metadata_columns: args.metadata_columns,
        zero_baseline: args.zero_baseline,
        timeout_secs: args.timeout_secs,
        top_n: args.top,
        join_key: args.join_key.clone(),
        outputs: OutputPaths {
            export_csv: args.export_csv.clone(),
            ..OutputPaths::default()
        },
        ..MapConfig::default()
    }
}

pub fn map_config_from_args(args: &MapArgs) -> MapConfig {
    let base = series_config_from_args(&args.series);
    MapConfig {
        geometry: Some(GeometrySource::parse(&args.geometry)),
        resolution: args.resolution,
        cartographic: !args.no_cartographic,
        name_field: args.name_field.clone(),
        outputs: OutputPaths {
            html: Some(args.html.clone()),
            svg: args.svg.clone(),
            export_geojson: args.export_geojson.clone(),
            ..base.outputs.clone()
        },
        svg_width: args.svg_width,
        svg_height: args.svg_height,
        ..base
    }
}
