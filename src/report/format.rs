//! Formatted terminal output.
//!
//! Formatting lives here so pipeline code stays free of presentation details
//! and output changes are localized.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{AppreciationRecord, AppreciationSet, SkipReason};
use crate::join::JoinSummary;
use crate::render::ColorScale;
use crate::report::Rankings;

/// Run summary: dates, record counts, skipped regions, join and scale info.
pub fn format_summary(
    dataset: &str,
    set: &AppreciationSet,
    join: Option<&JoinSummary>,
    scale: Option<&ColorScale>,
) -> String {
    let mut out = String::new();

    out.push_str("=== hpa - House Price Appreciation ===\n");
    out.push_str(&format!("Dataset: {dataset}\n"));
    out.push_str(&format!("Baseline: {} | Current: {}\n", set.baseline, set.current));
    out.push_str(&format!(
        "Regions: computed={} skipped={}\n",
        set.records.len(),
        set.skipped.len()
    ));

    let mut by_reason: BTreeMap<SkipReason, Vec<&str>> = BTreeMap::new();
    for s in &set.skipped {
        by_reason.entry(s.reason).or_default().push(s.region.as_str());
    }
    for (reason, regions) in &by_reason {
        out.push_str(&format!("  (skipped: {}) {}\n", reason.label(), regions.join(", ")));
    }

    if let Some(join) = join {
        out.push_str(&format!(
            "Join: matched={} | no data={} | no geometry={}\n",
            join.matched,
            join.unmatched_geometries.len(),
            join.orphan_regions.len()
        ));
        if !join.orphan_regions.is_empty() {
            out.push_str(&format!("  (dropped, no geometry) {}\n", join.orphan_regions.join(", ")));
        }
    }

    if let Some((min, max)) = scale.and_then(ColorScale::domain) {
        out.push_str(&format!("Color scale: [{min:.2}%, {max:.2}%]\n"));
    }

    out.push('\n');
    out
}

/// Highest / lowest appreciation tables.
pub fn format_rankings(rankings: &Rankings) -> String {
    let mut out = String::new();

    out.push_str("Highest appreciation:\n");
    out.push_str(&format_table(&rankings.highest));
    out.push('\n');

    out.push_str("Lowest appreciation:\n");
    out.push_str(&format_table(&rankings.lowest));

    out
}

/// One date per line, for picking exact baseline/current values.
pub fn format_dates(dates: &[NaiveDate]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} dates available", dates.len()));
    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        out.push_str(&format!(" ({first} .. {last})"));
    }
    out.push_str(":\n");
    for d in dates {
        out.push_str(&format!("{d}\n"));
    }
    out
}

fn format_table(rows: &[AppreciationRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<4} {:<24} {:>10}\n", "#", "Region", "HPA (%)"));
    for (idx, r) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<24} {:>10.2}\n",
            idx + 1,
            truncate(&r.region, 24),
            r.appreciation
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
