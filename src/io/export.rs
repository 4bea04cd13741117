//! Export appreciation records to CSV.
//!
//! The key column is named after the join key (e.g. `STUSPS`) so the file can be
//! joined against the same boundary data in a spreadsheet or GIS tool.

use std::path::Path;

use crate::domain::AppreciationSet;
use crate::error::AppError;

/// Write `{join_key},appreciation` rows, one per computed region.
pub fn write_appreciation_csv(path: &Path, set: &AppreciationSet, join_key: &str) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record([join_key, "appreciation"])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in &set.records {
        let value = format!("{:.2}", r.appreciation);
        writer
            .write_record([r.region.as_str(), value.as_str()])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::AppreciationRecord;

    #[test]
    fn header_uses_join_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hpa.csv");
        let set = AppreciationSet::new(
            NaiveDate::from_ymd_opt(2016, 3, 31).unwrap(),
            NaiveDate::from_ymd_opt(2017, 3, 31).unwrap(),
            vec![
                AppreciationRecord { region: "TX".to_string(), appreciation: -1.5 },
                AppreciationRecord { region: "CA".to_string(), appreciation: 10.0 },
            ],
            vec![],
        );

        write_appreciation_csv(&path, &set, "STUSPS").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "STUSPS,appreciation\nCA,10.00\nTX,-1.50\n");
    }
}
