//! Reporting utilities: rankings and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{AppreciationRecord, AppreciationSet};

/// Highest / lowest appreciation (top-N each side).
#[derive(Debug, Clone)]
pub struct Rankings {
    pub highest: Vec<AppreciationRecord>,
    pub lowest: Vec<AppreciationRecord>,
}

/// Rank regions by appreciation. Ties keep region order.
pub fn rank_appreciation(set: &AppreciationSet, top_n: usize) -> Rankings {
    let mut sorted = set.records.clone();
    sorted.sort_by(|a, b| b.appreciation.partial_cmp(&a.appreciation).unwrap_or(std::cmp::Ordering::Equal));
    let highest = sorted.iter().take(top_n).cloned().collect();

    let mut sorted_low = set.records.clone();
    sorted_low.sort_by(|a, b| a.appreciation.partial_cmp(&b.appreciation).unwrap_or(std::cmp::Ordering::Equal));
    let lowest = sorted_low.iter().take(top_n).cloned().collect();

    Rankings { highest, lowest }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn sample_set() -> AppreciationSet {
        AppreciationSet::new(
            NaiveDate::from_ymd_opt(2016, 3, 31).unwrap(),
            NaiveDate::from_ymd_opt(2017, 3, 31).unwrap(),
            vec![
                AppreciationRecord { region: "CA".to_string(), appreciation: 7.52 },
                AppreciationRecord { region: "ND".to_string(), appreciation: -1.1 },
                AppreciationRecord { region: "TX".to_string(), appreciation: 6.0 },
                AppreciationRecord { region: "WA".to_string(), appreciation: 12.4 },
            ],
            vec![],
        )
    }

    #[test]
    fn rank_appreciation_basic() {
        let rankings = rank_appreciation(&sample_set(), 2);
        let high: Vec<&str> = rankings.highest.iter().map(|r| r.region.as_str()).collect();
        let low: Vec<&str> = rankings.lowest.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(high, vec!["WA", "CA"]);
        assert_eq!(low, vec!["ND", "TX"]);
    }

    #[test]
    fn rank_handles_top_n_larger_than_set() {
        let rankings = rank_appreciation(&sample_set(), 50);
        assert_eq!(rankings.highest.len(), 4);
        assert_eq!(rankings.lowest.len(), 4);
    }
}
