//! CSV-backed repositories: one `<key>.csv` per key under a base directory,
//! with a header row and rows sorted ascending by date.

pub mod market_indicator_repo;
pub mod news_repo;
pub mod price_repo;
pub mod stock_indicator_repo;

use crate::domain::error::DomainError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Returns `dir` if it exists, a `Config` error otherwise.
pub(crate) fn existing_dir(dir: &Path) -> Result<PathBuf, DomainError> {
    if !dir.is_dir() {
        return Err(DomainError::Config(format!(
            "Base path {} does not exist",
            dir.display()
        )));
    }
    Ok(dir.to_path_buf())
}

pub(crate) fn file_for(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.csv"))
}

/// File stems of every `*.csv` file in `dir`.
pub(crate) fn csv_keys(dir: &Path) -> Result<BTreeSet<String>, DomainError> {
    let mut keys = BTreeSet::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.insert(stem.to_string());
            }
        }
    }
    Ok(keys)
}

/// Parses an optional numeric cell; empty and `NaN` cells are absent.
pub(crate) fn parse_cell(cell: &str) -> Result<Option<f64>, DomainError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    let value: f64 = cell
        .parse()
        .map_err(|e| DomainError::Storage(format!("Invalid number '{cell}': {e}")))?;
    Ok(Some(value).filter(|v| !v.is_nan()))
}

pub(crate) fn format_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
