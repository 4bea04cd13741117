//! Annual appreciation transform.
//!
//! Pipeline: select the two dates -> melt to long rows -> group by region ->
//! lagged percent change -> drop incomplete regions.
//!
//! Rounding reproduces the two-step convention used for published HPA tables:
//! the fractional change is rounded to 4 decimals *before* scaling to percent,
//! so 0.04521 becomes 0.0452 and then 4.52 (never 4.521).

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use tracing::{debug, warn};

use crate::domain::{
    AppreciationRecord, AppreciationSet, SkipReason, SkippedRegion, TidyRow, WideRow, WideSeries,
    ZeroBaselinePolicy,
};
use crate::error::TransformError;

/// Decimals kept on the fractional change.
const FRACTION_DECIMALS: i32 = 4;
/// Decimals kept on the percent value (only strips float noise from the ×100).
const PERCENT_DECIMALS: i32 = 2;

/// Compute per-region percent appreciation between `baseline` and `current`.
pub fn appreciation(
    series: &WideSeries,
    baseline: NaiveDate,
    current: NaiveDate,
    policy: ZeroBaselinePolicy,
) -> Result<AppreciationSet, TransformError> {
    if current <= baseline {
        return Err(TransformError::DateOrder { baseline, current });
    }

    let selected = select_dates(series.rows(), baseline, current);
    debug!(rows = selected.len(), %baseline, %current, "selected date rows");

    let tidy = melt(series.regions(), &selected);
    let groups = group_by_region(tidy);

    let mut records = Vec::new();
    let mut skipped = Vec::new();

    // Iterate over the declared columns so regions with no selected rows are
    // still reported as skipped.
    for region in series.regions() {
        let observations = groups.get(region.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        match lagged_change(observations, baseline, current) {
            Ok(appreciation) => records.push(AppreciationRecord {
                region: region.clone(),
                appreciation,
            }),
            Err(SkipReason::ZeroBaseline) => match policy {
                ZeroBaselinePolicy::Fail => {
                    return Err(TransformError::DivisionByZero {
                        region: region.clone(),
                    });
                }
                ZeroBaselinePolicy::Skip => {
                    warn!(region = %region, "baseline value is zero; region excluded");
                    skipped.push(SkippedRegion {
                        region: region.clone(),
                        reason: SkipReason::ZeroBaseline,
                    });
                }
            },
            Err(SkipReason::NonFinite) => {
                warn!(region = %region, "appreciation is not finite; region excluded");
                skipped.push(SkippedRegion {
                    region: region.clone(),
                    reason: SkipReason::NonFinite,
                });
            }
            Err(reason) => skipped.push(SkippedRegion {
                region: region.clone(),
                reason,
            }),
        }
    }

    Ok(AppreciationSet::new(baseline, current, records, skipped))
}

/// Keep only rows dated exactly `baseline` or `current`.
pub fn select_dates(rows: &[WideRow], baseline: NaiveDate, current: NaiveDate) -> Vec<WideRow> {
    rows.iter()
        .filter(|row| row.date == baseline || row.date == current)
        .cloned()
        .collect()
}

/// Unpivot wide rows into one `TidyRow` per (row, region) pair.
pub fn melt(regions: &[String], rows: &[WideRow]) -> Vec<TidyRow> {
    let mut out = Vec::with_capacity(rows.len() * regions.len());
    for row in rows {
        for (region, value) in regions.iter().zip(row.values.iter()) {
            out.push(TidyRow {
                region: region.clone(),
                date: row.date,
                value: *value,
            });
        }
    }
    out
}

/// Group tidy rows by region; each group is sorted by date ascending.
pub fn group_by_region(rows: Vec<TidyRow>) -> BTreeMap<String, Vec<(NaiveDate, Option<f64>)>> {
    let mut groups: BTreeMap<String, Vec<(NaiveDate, Option<f64>)>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.region).or_default().push((row.date, row.value));
    }
    for observations in groups.values_mut() {
        observations.sort_by_key(|(date, _)| *date);
    }
    groups
}

/// Percent change for one region's date-sorted observations.
///
/// Succeeds only with exactly two observations, one per date, both non-null.
fn lagged_change(
    observations: &[(NaiveDate, Option<f64>)],
    baseline: NaiveDate,
    current: NaiveDate,
) -> Result<f64, SkipReason> {
    let base_count = observations.iter().filter(|(d, _)| *d == baseline).count();
    let current_count = observations.iter().filter(|(d, _)| *d == current).count();

    if base_count == 0 {
        return Err(SkipReason::MissingBaseline);
    }
    if current_count == 0 {
        return Err(SkipReason::MissingCurrent);
    }
    if observations.len() != 2 {
        return Err(SkipReason::DuplicateDate);
    }

    let (Some(older), Some(newer)) = (observations[0].1, observations[1].1) else {
        return Err(SkipReason::NullValue);
    };

    if older == 0.0 {
        return Err(SkipReason::ZeroBaseline);
    }
    percent_change(older, newer).ok_or(SkipReason::NonFinite)
}

/// `round(round((current - baseline) / baseline, 4) * 100, 2)`.
///
/// Returns `None` when `baseline` is zero or the result is not finite
/// (overflow on a vanishingly small baseline).
pub fn percent_change(baseline: f64, current: f64) -> Option<f64> {
    if baseline == 0.0 {
        return None;
    }
    let fraction = round_to((current - baseline) / baseline, FRACTION_DECIMALS);
    let percent = round_to(fraction * 100.0, PERCENT_DECIMALS);
    percent.is_finite().then_some(percent)
}

/// Round half away from zero at `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Default date pair: latest date in the series and twelve months earlier.
pub fn default_date_pair(series: &WideSeries) -> Option<(NaiveDate, NaiveDate)> {
    let current = series.latest_date()?;
    Some((year_before(current)?, current))
}

/// Same calendar day twelve months earlier, clamped to the month end.
pub fn year_before(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(12))
}
