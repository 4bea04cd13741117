//! Left-outer join of appreciation records onto region geometries.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{AppreciationSet, RegionGeometry, ShadedRegion};

/// Match diagnostics for a join.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinSummary {
    pub matched: usize,
    /// Geometry codes with no appreciation (rendered in the neutral color).
    pub unmatched_geometries: Vec<String>,
    /// Appreciation regions with no geometry (dropped).
    pub orphan_regions: Vec<String>,
}

/// Join `set` onto `geometries` by exact, case-sensitive code.
///
/// Every geometry is kept, in input order; unmatched ones get `None`.
pub fn left_join(geometries: &[RegionGeometry], set: &AppreciationSet) -> (Vec<ShadedRegion>, JoinSummary) {
    let mut summary = JoinSummary::default();
    let mut seen_codes = HashSet::with_capacity(geometries.len());

    let shaded: Vec<ShadedRegion> = geometries
        .iter()
        .map(|geo| {
            seen_codes.insert(geo.code.as_str());
            let appreciation = set.get(&geo.code);
            match appreciation {
                Some(_) => summary.matched += 1,
                None => summary.unmatched_geometries.push(geo.code.clone()),
            }
            ShadedRegion {
                code: geo.code.clone(),
                name: geo.name.clone(),
                geometry: geo.geometry.clone(),
                appreciation,
            }
        })
        .collect();

    summary.orphan_regions = set
        .records
        .iter()
        .filter(|r| !seen_codes.contains(r.region.as_str()))
        .map(|r| r.region.clone())
        .collect();

    debug!(
        matched = summary.matched,
        unmatched = ?summary.unmatched_geometries,
        orphans = ?summary.orphan_regions,
        "joined appreciation onto geometries"
    );

    (shaded, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    use crate::domain::AppreciationRecord;

    fn geo(code: &str, name: &str) -> RegionGeometry {
        RegionGeometry {
            code: code.to_string(),
            name: name.to_string(),
            geometry: json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}),
        }
    }

    fn set(records: &[(&str, f64)]) -> AppreciationSet {
        AppreciationSet::new(
            NaiveDate::from_ymd_opt(2016, 3, 31).unwrap(),
            NaiveDate::from_ymd_opt(2017, 3, 31).unwrap(),
            records
                .iter()
                .map(|(r, a)| AppreciationRecord {
                    region: r.to_string(),
                    appreciation: *a,
                })
                .collect(),
            vec![],
        )
    }

    #[test]
    fn keeps_every_geometry_in_order() {
        let geometries = vec![geo("TX", "Texas"), geo("CA", "California"), geo("PR", "Puerto Rico")];
        let (shaded, summary) = left_join(&geometries, &set(&[("CA", 10.0), ("DC", 3.1), ("TX", 0.0)]));

        assert_eq!(shaded.len(), geometries.len());
        let codes: Vec<&str> = shaded.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["TX", "CA", "PR"]);
        assert_eq!(shaded[0].appreciation, Some(0.0));
        assert_eq!(shaded[1].appreciation, Some(10.0));
        assert_eq!(shaded[2].appreciation, None);

        assert_eq!(summary.matched, 2);
        assert_eq!(summary.unmatched_geometries, vec!["PR".to_string()]);
        assert_eq!(summary.orphan_regions, vec!["DC".to_string()]);
    }

    #[test]
    fn cardinality_holds_with_no_matches() {
        let geometries = vec![geo("CA", "California"), geo("TX", "Texas")];
        let (shaded, summary) = left_join(&geometries, &set(&[]));
        assert_eq!(shaded.len(), 2);
        assert!(shaded.iter().all(|s| s.appreciation.is_none()));
        assert_eq!(summary.matched, 0);
    }

    #[test]
    fn match_is_case_sensitive() {
        let (shaded, _) = left_join(&[geo("ca", "California")], &set(&[("CA", 10.0)]));
        assert_eq!(shaded[0].appreciation, None);
    }
}
