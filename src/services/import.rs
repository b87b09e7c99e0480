//! CSV event import
//!
//! Bulk-loads recorded cash-flow events from a CSV file with the columns
//! `date,type,amount,provider,category,account,memo` (provider onward
//! optional). Amounts are decimal dollars with the event sign convention:
//! negative = inflow. Bad rows are collected and reported, not fatal.

use std::path::Path;

use chrono::NaiveDate;

use crate::error::{CadenceError, CadenceResult};
use crate::models::{CashFlowEvent, EventType, Money};
use crate::storage::EventStore;

/// Outcome of one import run
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    /// (1-based row number, reason) for each rejected row
    pub skipped: Vec<(usize, String)>,
}

fn optional(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_row(record: &csv::StringRecord) -> CadenceResult<CashFlowEvent> {
    let date_field = record
        .get(0)
        .ok_or_else(|| CadenceError::Import("missing date column".into()))?;
    let date = NaiveDate::parse_from_str(date_field.trim(), "%Y-%m-%d")
        .map_err(|e| CadenceError::Import(format!("bad date '{date_field}': {e}")))?;

    let kind: EventType = record
        .get(1)
        .ok_or_else(|| CadenceError::Import("missing type column".into()))?
        .parse()?;

    let amount_field = record
        .get(2)
        .ok_or_else(|| CadenceError::Import("missing amount column".into()))?;
    let amount = Money::parse(amount_field)?;

    let mut event = CashFlowEvent::new(date, kind, amount);
    event.provider = optional(record.get(3));
    event.category = optional(record.get(4));
    event.account = optional(record.get(5));
    event.memo = optional(record.get(6));
    Ok(event)
}

/// Import events from `path` into the store. Returns counts of imported
/// and skipped rows; only file-level failures are errors.
pub fn import_events(path: &Path, store: &mut dyn EventStore) -> CadenceResult<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| CadenceError::Import(format!("cannot open {}: {e}", path.display())))?;

    let mut result = ImportResult::default();

    for (index, row) in reader.records().enumerate() {
        let row_number = index + 2; // 1-based, after the header line
        let record = match row {
            Ok(r) => r,
            Err(e) => {
                result.skipped.push((row_number, e.to_string()));
                continue;
            }
        };

        match parse_row(&record) {
            Ok(event) => {
                store.insert(event)?;
                result.imported += 1;
            }
            Err(e) => result.skipped.push((row_number, e.to_string())),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{EventFilter, JsonEventStore};
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("events.csv");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_import_good_rows() {
        let temp = TempDir::new().unwrap();
        let csv_path = write_csv(
            &temp,
            "date,type,amount,provider,category,account,memo\n\
             2025-06-02,advance,-300.00,EarnIn,advance,checking,mid-week draw\n\
             2025-06-05,repayment,305.00,EarnIn,,,\n",
        );

        let mut store = JsonEventStore::open(temp.path().join("events.json")).unwrap();
        let result = import_events(&csv_path, &mut store).unwrap();

        assert_eq!(result.imported, 2);
        assert!(result.skipped.is_empty());

        let events = store
            .query(
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
                &EventFilter::any(),
            )
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].amount, Money::from_cents(-30_000));
        assert_eq!(events[0].memo.as_deref(), Some("mid-week draw"));
        assert_eq!(events[1].provider.as_deref(), Some("EarnIn"));
        assert_eq!(events[1].category, None);
    }

    #[test]
    fn test_bad_rows_are_skipped_with_reasons() {
        let temp = TempDir::new().unwrap();
        let csv_path = write_csv(
            &temp,
            "date,type,amount\n\
             not-a-date,spend,12.00\n\
             2025-06-03,mystery,12.00\n\
             2025-06-04,spend,12.00\n",
        );

        let mut store = JsonEventStore::open(temp.path().join("events.json")).unwrap();
        let result = import_events(&csv_path, &mut store).unwrap();

        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped.len(), 2);
        assert_eq!(result.skipped[0].0, 2);
        assert!(result.skipped[1].1.contains("mystery"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut store = JsonEventStore::open(temp.path().join("events.json")).unwrap();
        assert!(import_events(&temp.path().join("nope.csv"), &mut store).is_err());
    }
}
