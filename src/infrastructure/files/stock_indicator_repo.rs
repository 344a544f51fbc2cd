use super::price_repo::parse_date;
use super::{csv_keys, existing_dir, file_for, format_cell, parse_cell};
use crate::domain::entities::indicator_table::IndicatorTable;
use crate::domain::error::DomainError;
use crate::domain::ports::repository::Repository;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Wide layout: `date,<indicator>,<indicator>...`. Storing a previously unseen
/// indicator appends a column.
pub struct CsvStockIndicatorRepo {
    base_path: PathBuf,
}

impl CsvStockIndicatorRepo {
    pub fn new(base_path: &Path) -> Result<Self, DomainError> {
        Ok(Self {
            base_path: existing_dir(base_path)?,
        })
    }

    fn read(path: &Path) -> Result<IndicatorTable, DomainError> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        if headers.get(0) != Some("date") {
            return Err(DomainError::Storage(format!(
                "{} has no leading date column",
                path.display()
            )));
        }

        let mut table = IndicatorTable::new();
        table.columns = headers.iter().skip(1).map(String::from).collect();
        for record in reader.records() {
            let record = record?;
            let date = parse_date(record.get(0).unwrap_or(""))?;
            for (i, indicator) in headers.iter().enumerate().skip(1) {
                table.set(date, indicator, parse_cell(record.get(i).unwrap_or(""))?);
            }
        }
        Ok(table)
    }
}

impl Repository<IndicatorTable> for CsvStockIndicatorRepo {
    fn list_keys(&self) -> Result<BTreeSet<String>, DomainError> {
        csv_keys(&self.base_path)
    }

    fn get(&self, key: &str) -> Result<Option<IndicatorTable>, DomainError> {
        let path = file_for(&self.base_path, key);
        if !path.exists() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    fn store(&self, key: &str, value: &IndicatorTable) -> Result<(), DomainError> {
        let path = file_for(&self.base_path, key);
        let mut merged = if path.exists() {
            info!(symbol = key, "Loading existing stock indicator file");
            Self::read(&path)?
        } else {
            info!(symbol = key, "Creating new stock indicator file");
            IndicatorTable::new()
        };
        merged.merge(value);

        let mut writer = csv::Writer::from_path(&path)?;
        let header: Vec<&str> = std::iter::once("date")
            .chain(merged.columns.iter().map(String::as_str))
            .collect();
        writer.write_record(&header)?;
        for date in merged.rows.keys() {
            let record: Vec<String> = std::iter::once(date.format("%Y-%m-%d").to_string())
                .chain(merged.row(*date).into_iter().map(|(_, v)| format_cell(v)))
                .collect();
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_file_grows_new_column() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvStockIndicatorRepo::new(dir.path()).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let mut first = IndicatorTable::new();
        first.set(d1, "RSI", Some(50.0));
        repo.store("ACME", &first).unwrap();

        let mut second = IndicatorTable::new();
        second.set(d2, "RSI", Some(55.0));
        second.set(d2, "OBV", Some(1200.0));
        repo.store("ACME", &second).unwrap();

        let text = std::fs::read_to_string(dir.path().join("ACME.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["date,RSI,OBV", "2024-01-01,50,", "2024-01-02,55,1200"]);

        let stored = repo.get("ACME").unwrap().unwrap();
        assert_eq!(stored.get(d1, "OBV"), None);
        assert_eq!(stored.get(d2, "OBV"), Some(1200.0));
    }
}
