use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Technical indicators of one symbol: for every date, one value per indicator id.
///
/// `columns` keeps indicator ids in first-seen order so stored files only ever
/// grow new columns at the end, and rendering follows the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorTable {
    pub columns: Vec<String>,
    pub rows: BTreeMap<NaiveDate, HashMap<String, Option<f64>>>,
}

impl IndicatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one cell, registering the column if it is new.
    pub fn set(&mut self, date: NaiveDate, indicator: &str, value: Option<f64>) {
        if !self.columns.iter().any(|c| c == indicator) {
            self.columns.push(indicator.to_string());
        }
        self.rows
            .entry(date)
            .or_default()
            .insert(indicator.to_string(), value.filter(|v| !v.is_nan()));
    }

    pub fn get(&self, date: NaiveDate, indicator: &str) -> Option<f64> {
        self.rows
            .get(&date)
            .and_then(|row| row.get(indicator))
            .copied()
            .flatten()
    }

    /// The row for `date` as `(indicator, value)` pairs in column order.
    /// Columns the row never received are reported as `None`.
    pub fn row(&self, date: NaiveDate) -> Vec<(&str, Option<f64>)> {
        let Some(row) = self.rows.get(&date) else {
            return Vec::new();
        };
        self.columns
            .iter()
            .map(|c| (c.as_str(), row.get(c).copied().flatten()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell-wise upsert: every cell present in `newer` overwrites ours, cells it
    /// does not mention are kept.
    pub fn merge(&mut self, newer: &IndicatorTable) {
        for (date, row) in &newer.rows {
            for indicator in &newer.columns {
                if let Some(value) = row.get(indicator) {
                    self.set(*date, indicator, *value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_merge_appends_columns_and_overwrites_cells() {
        let mut old = IndicatorTable::new();
        old.set(d("2024-01-01"), "RSI", Some(40.0));
        old.set(d("2024-01-01"), "SMA50", Some(100.0));

        let mut new = IndicatorTable::new();
        new.set(d("2024-01-01"), "RSI", Some(45.0));
        new.set(d("2024-01-02"), "OBV", Some(1000.0));

        old.merge(&new);
        assert_eq!(old.columns, vec!["RSI", "SMA50", "OBV"]);
        assert_eq!(old.get(d("2024-01-01"), "RSI"), Some(45.0));
        assert_eq!(old.get(d("2024-01-01"), "SMA50"), Some(100.0));
        assert_eq!(old.get(d("2024-01-02"), "OBV"), Some(1000.0));
        assert_eq!(
            old.row(d("2024-01-02")),
            vec![("RSI", None), ("SMA50", None), ("OBV", Some(1000.0))]
        );
    }
}
