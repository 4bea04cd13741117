//! Wide CSV ingest.
//!
//! Turns a `Date,<region>,<region>,...` CSV (the same shape the time-series
//! provider returns) into a [`WideSeries`].
//!
//! - the first column is always the date column, whatever its name
//! - empty, `NA` and non-numeric cells become `None` (missing, not an error)
//! - unparseable dates and ragged rows are errors: there is no sensible row to keep

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{WideRow, WideSeries};
use crate::error::ProviderError;

const PROVIDER: &str = "CSV series";

/// Load a wide series from a CSV file.
pub fn load_wide_csv(path: &Path) -> Result<WideSeries, ProviderError> {
    let file = File::open(path).map_err(|source| ProviderError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_wide_csv(file)
}

/// Parse a wide series from any reader (file, bytes in tests).
pub fn read_wide_csv<R: std::io::Read>(reader: R) -> Result<WideSeries, ProviderError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| ProviderError::malformed(PROVIDER, format!("failed to read CSV headers: {e}")))?
        .clone();

    let mut columns = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| if idx == 0 { normalize_header_name(name) } else { name.to_string() });
    let date_column = columns
        .next()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "CSV has no date column"))?;
    let regions: Vec<String> = columns.collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| ProviderError::malformed(PROVIDER, format!("line {line}: {e}")))?;
        rows.push(parse_row(&record, line)?);
    }

    WideSeries::new(date_column, regions, rows).map_err(|e| ProviderError::malformed(PROVIDER, e.to_string()))
}

fn parse_row(record: &StringRecord, line: usize) -> Result<WideRow, ProviderError> {
    let raw_date = record
        .get(0)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProviderError::malformed(PROVIDER, format!("line {line}: missing date")))?;
    let date = parse_date(raw_date).map_err(|e| ProviderError::malformed(PROVIDER, format!("line {line}: {e}")))?;

    let values = record.iter().skip(1).map(parse_opt_f64).collect();
    Ok(WideRow { date, values })
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    // Region names are otherwise kept byte-for-byte.
    name.trim_start_matches('\u{feff}').to_string()
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY."
    ))
}

fn parse_opt_f64(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
