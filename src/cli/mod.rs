//! Command-line parsing for the HPA choropleth tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! transform, join and rendering code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{Resolution, ZeroBaselinePolicy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hpa", version, about = "Regional house price appreciation choropleth")]
pub struct Cli {
    /// Emit logs as JSON lines (also `HPA_LOG_JSON=1`).
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute appreciation, join onto region boundaries, and render the map.
    Map(MapArgs),
    /// Print highest/lowest appreciation only (no geometry needed).
    Rank(SeriesArgs),
    /// List the dates available in the series.
    Dates(SeriesArgs),
}

/// Options shared by every subcommand that reads the series.
#[derive(Debug, Args, Clone)]
pub struct SeriesArgs {
    /// Provider dataset code.
    #[arg(long, default_value = "FMAC/HPI")]
    pub dataset: String,

    /// Read the wide series from a local CSV instead of the provider.
    #[arg(long, value_name = "CSV")]
    pub series_csv: Option<PathBuf>,

    /// Baseline date (YYYY-MM-DD). Defaults to twelve months before `--current`.
    #[arg(long, value_parser = parse_date)]
    pub baseline: Option<NaiveDate>,

    /// Current date (YYYY-MM-DD). Defaults to the latest date in the series.
    #[arg(long, value_parser = parse_date)]
    pub current: Option<NaiveDate>,

    /// Number of trailing provider columns that are metadata, not regions.
    #[arg(long, default_value_t = 2)]
    pub metadata_columns: usize,

    /// What to do when a region's baseline value is zero.
    #[arg(long, value_enum, default_value_t = ZeroBaselinePolicy::Skip)]
    pub zero_baseline: ZeroBaselinePolicy,

    /// Timeout (seconds) for each external request.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Show top-N highest and lowest regions.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Export `{join-key},appreciation` rows to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Column name used for the region key in exports.
    #[arg(long, default_value = "STUSPS")]
    pub join_key: String,
}

/// Options for `hpa map`.
#[derive(Debug, Args, Clone)]
pub struct MapArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    /// GeoJSON boundaries: a file path, or an http(s) URL template with
    /// optional `{resolution}` and `{kind}` placeholders.
    #[arg(long, value_name = "PATH|URL")]
    pub geometry: String,

    /// Boundary resolution requested from the geometry provider.
    #[arg(long, value_enum, default_value_t = Resolution::R20m)]
    pub resolution: Resolution,

    /// Request cartographic (coastline-clipped) boundaries. This is the default.
    #[arg(long, overrides_with = "no_cartographic")]
    pub cartographic: bool,

    /// Request full TIGER shapes instead of cartographic boundaries.
    #[arg(long, overrides_with = "cartographic")]
    pub no_cartographic: bool,

    /// Feature property holding the display name.
    #[arg(long, default_value = "NAME")]
    pub name_field: String,

    /// Interactive Leaflet map output.
    #[arg(long, value_name = "HTML", default_value = "hpa_map.html")]
    pub html: PathBuf,

    /// Also write a static SVG map.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,

    /// SVG width (pixels).
    #[arg(long, default_value_t = 1200)]
    pub svg_width: u32,

    /// SVG height (pixels).
    #[arg(long, default_value_t = 700)]
    pub svg_height: u32,

    /// Export the joined regions as GeoJSON.
    #[arg(long = "export-geojson", value_name = "GEOJSON")]
    pub export_geojson: Option<PathBuf>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_defaults() {
        let cli = Cli::parse_from(["hpa", "map", "--geometry", "states.geojson"]);
        let Command::Map(args) = cli.command else {
            panic!("expected map subcommand");
        };
        assert_eq!(args.series.dataset, "FMAC/HPI");
        assert_eq!(args.series.metadata_columns, 2);
        assert_eq!(args.series.zero_baseline, ZeroBaselinePolicy::Skip);
        assert_eq!(args.resolution, Resolution::R20m);
        assert_eq!(args.html, PathBuf::from("hpa_map.html"));
        assert!(!args.no_cartographic);
    }

    #[test]
    fn rank_parses_dates_and_policy() {
        let cli = Cli::parse_from([
            "hpa",
            "rank",
            "--baseline",
            "2016-03-31",
            "--current",
            "2017-03-31",
            "--zero-baseline",
            "fail",
            "--log-json",
        ]);
        assert!(cli.log_json);
        let Command::Rank(args) = cli.command else {
            panic!("expected rank subcommand");
        };
        assert_eq!(args.baseline, NaiveDate::from_ymd_opt(2016, 3, 31));
        assert_eq!(args.zero_baseline, ZeroBaselinePolicy::Fail);
    }

    #[test]
    fn rejects_bad_date() {
        assert!(Cli::try_parse_from(["hpa", "rank", "--baseline", "Q1 2016"]).is_err());
    }

    #[test]
    fn resolution_value_names() {
        let cli = Cli::parse_from(["hpa", "map", "--geometry", "x.json", "--resolution", "500k"]);
        let Command::Map(args) = cli.command else {
            panic!("expected map subcommand");
        };
        assert_eq!(args.resolution, Resolution::R500k);
    }

    #[test]
    fn last_cartographic_flag_wins() {
        let cli = Cli::parse_from([
            "hpa",
            "map",
            "--geometry",
            "x.json",
            "--no-cartographic",
            "--cartographic",
        ]);
        let Command::Map(args) = cli.command else {
            panic!("expected map subcommand");
        };
        assert!(!args.no_cartographic);
    }
}
