use super::price_repo::parse_date;
use super::{csv_keys, existing_dir, file_for, format_cell, parse_cell};
use crate::domain::entities::indicator_series::IndicatorSeries;
use crate::domain::error::DomainError;
use crate::domain::ports::repository::Repository;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct CsvMarketIndicatorRepo {
    base_path: PathBuf,
}

impl CsvMarketIndicatorRepo {
    pub fn new(base_path: &Path) -> Result<Self, DomainError> {
        Ok(Self {
            base_path: existing_dir(base_path)?,
        })
    }

    fn read(path: &Path) -> Result<IndicatorSeries, DomainError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut series = IndicatorSeries::new();
        for record in reader.records() {
            let record = record?;
            let date = parse_date(record.get(0).unwrap_or(""))?;
            // unparseable values are stored as absent rather than failing the read
            let value = parse_cell(record.get(1).unwrap_or("")).unwrap_or(None);
            series.insert(date, value);
        }
        Ok(series)
    }
}

impl Repository<IndicatorSeries> for CsvMarketIndicatorRepo {
    fn list_keys(&self) -> Result<BTreeSet<String>, DomainError> {
        csv_keys(&self.base_path)
    }

    fn get(&self, key: &str) -> Result<Option<IndicatorSeries>, DomainError> {
        let path = file_for(&self.base_path, key);
        if !path.exists() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    fn store(&self, key: &str, value: &IndicatorSeries) -> Result<(), DomainError> {
        let path = file_for(&self.base_path, key);
        let mut merged = if path.exists() {
            info!(indicator = key, "Updating indicator");
            Self::read(&path)?
        } else {
            info!(indicator = key, "Creating indicator");
            IndicatorSeries::new()
        };
        merged.merge(value);

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["date", "value"])?;
        for (date, v) in &merged.values {
            writer.write_record([date.format("%Y-%m-%d").to_string(), format_cell(*v)])?;
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
    fn test_store_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvMarketIndicatorRepo::new(dir.path()).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        repo.store("UNRATE", &[(d2, Some(3.7)), (d1, None)].into_iter().collect())
            .unwrap();
        repo.store("UNRATE", &[(d1, Some(3.9))].into_iter().collect())
            .unwrap();

        let stored = repo.get("UNRATE").unwrap().unwrap();
        assert_eq!(stored.values.into_iter().collect::<Vec<_>>(), vec![(d1, Some(3.9)), (d2, Some(3.7))]);
    }

    #[test]
    fn test_non_numeric_values_read_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("X.csv"), "date,value\n2024-01-01,.\n2024-01-02,1.5\n").unwrap();
        let repo = CsvMarketIndicatorRepo::new(dir.path()).unwrap();

        let stored = repo.get("X").unwrap().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored.values.values().copied().collect::<Vec<_>>(), vec![None, Some(1.5)]);
    }
}
