use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Dated values of one macro indicator (e.g. a FRED series). `None` marks a
/// date the provider reported without a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    pub values: BTreeMap<NaiveDate, Option<f64>>,
}

impl IndicatorSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, value: Option<f64>) {
        self.values.insert(date, value.filter(|v| !v.is_nan()));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Upserts `newer` into this series; newer values win on the same date.
    pub fn merge(&mut self, newer: &IndicatorSeries) {
        self.values
            .extend(newer.values.iter().map(|(date, value)| (*date, *value)));
    }
}

impl FromIterator<(NaiveDate, Option<f64>)> for IndicatorSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, Option<f64>)>>(iter: I) -> Self {
        let mut series = IndicatorSeries::new();
        for (date, value) in iter {
            series.insert(date, value);
        }
        series
    }
}
