use super::{csv_keys, existing_dir, file_for, format_cell, parse_cell};
use crate::domain::entities::price_series::{PriceBar, PriceSeries};
use crate::domain::error::DomainError;
use crate::domain::ports::repository::Repository;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const HEADER: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvPriceRepo {
    base_path: PathBuf,
}

impl CsvPriceRepo {
    pub fn new(base_path: &Path) -> Result<Self, DomainError> {
        Ok(Self {
            base_path: existing_dir(base_path)?,
        })
    }

    fn read(&self, path: &Path, symbol: &str) -> Result<PriceSeries, DomainError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut series = PriceSeries::new(symbol);
        for record in reader.records() {
            let record = record?;
            let cell = |i: usize| parse_cell(record.get(i).unwrap_or(""));
            let date = parse_date(record.get(0).unwrap_or(""))?;
            let bar = PriceBar::new(cell(1)?, cell(2)?, cell(3)?, cell(4)?, cell(5)?);
            series.bars.insert(date, bar);
        }
        Ok(series)
    }
}

/// Accepts plain dates as well as the `YYYY-MM-DD HH:MM:SS` form older files carry.
pub(crate) fn parse_date(cell: &str) -> Result<NaiveDate, DomainError> {
    let day = cell.trim().get(..10).unwrap_or(cell);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| DomainError::Storage(format!("Invalid date '{cell}': {e}")))
}

impl Repository<PriceSeries> for CsvPriceRepo {
    fn list_keys(&self) -> Result<BTreeSet<String>, DomainError> {
        csv_keys(&self.base_path)
    }

    fn get(&self, key: &str) -> Result<Option<PriceSeries>, DomainError> {
        let path = file_for(&self.base_path, key);
        if !path.exists() {
            return Ok(None);
        }
        self.read(&path, key).map(Some)
    }

    fn store(&self, key: &str, value: &PriceSeries) -> Result<(), DomainError> {
        let path = file_for(&self.base_path, key);
        let mut merged = if path.exists() {
            debug!(symbol = key, "Loading existing stock data file");
            self.read(&path, key)?
        } else {
            info!(symbol = key, "Creating new stock data file");
            PriceSeries::new(key)
        };
        merged.merge(value);

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(HEADER)?;
        for (date, bar) in &merged.bars {
            writer.write_record([
                date.format("%Y-%m-%d").to_string(),
                format_cell(bar.open),
                format_cell(bar.high),
                format_cell(bar.low),
                format_cell(bar.close),
                format_cell(bar.volume),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_missing_base_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            CsvPriceRepo::new(&missing),
            Err(DomainError::Config(_))
        ));
    }

    #[test]
    fn test_store_upserts_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvPriceRepo::new(dir.path()).unwrap();

        let mut first = PriceSeries::new("ACME");
        first.bars.insert(d("2024-01-02"), PriceBar::ohlcv(11.0, 13.0, 10.0, 12.0, 900.0));
        first.bars.insert(d("2024-01-01"), PriceBar::ohlcv(10.0, 12.0, 9.0, 11.0, 1000.0));
        repo.store("ACME", &first).unwrap();

        let mut second = PriceSeries::new("ACME");
        second.bars.insert(d("2024-01-01"), PriceBar::ohlcv(10.0, 12.0, 9.0, 11.5, 1200.0));
        repo.store("ACME", &second).unwrap();

        let stored = repo.get("ACME").unwrap().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored.bars[&d("2024-01-01")].close, Some(11.5));
        assert_eq!(stored.bars[&d("2024-01-01")].volume, Some(1200.0));

        let text = std::fs::read_to_string(dir.path().join("ACME.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,open,high,low,close,volume");
        assert!(lines[1].starts_with("2024-01-01,"));
        assert!(lines[2].starts_with("2024-01-02,"));
    }

    #[test]
    fn test_reads_nan_and_empty_cells_as_unknown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("OLD.csv"),
            "date,open,high,low,close,volume\n2024-01-10 00:00:00,1.0,2.0,0.5,1.5,NaN\n2024-01-11,1.0,,0.5,1.5,10\n",
        )
        .unwrap();
        let repo = CsvPriceRepo::new(dir.path()).unwrap();

        let stored = repo.get("OLD").unwrap().unwrap();
        assert_eq!(stored.bars[&d("2024-01-10")].volume, None);
        assert_eq!(stored.bars[&d("2024-01-11")].high, None);
        assert!(repo.list_keys().unwrap().contains("OLD"));
        assert!(repo.get("NEW").unwrap().is_none());
    }
}
