use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One daily OHLCV bar. Every field may be unknown; `NaN` is folded into `None`
/// on construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl PriceBar {
    pub fn new(
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: Option<f64>,
        volume: Option<f64>,
    ) -> Self {
        Self {
            open: known(open),
            high: known(high),
            low: known(low),
            close: known(close),
            volume: known(volume),
        }
    }

    /// Shorthand for a bar with every field present.
    pub fn ohlcv(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self::new(Some(open), Some(high), Some(low), Some(close), Some(volume))
    }

    /// True when all five fields are present and not `NaN`.
    pub fn is_complete(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| known(*v).is_some())
    }
}

/// Drops `NaN`, keeping absence explicit.
pub fn known(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// All stored daily bars of one symbol, keyed and ordered by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: BTreeMap<NaiveDate, PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: BTreeMap::new(),
        }
    }

    pub fn with_bars(symbol: impl Into<String>, bars: BTreeMap<NaiveDate, PriceBar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Upserts `newer` into this series; bars from `newer` win on the same date.
    pub fn merge(&mut self, newer: &PriceSeries) {
        self.bars
            .extend(newer.bars.iter().map(|(date, bar)| (*date, *bar)));
    }

    /// Bars dated on or before `until`, ascending.
    pub fn bars_until(&self, until: NaiveDate) -> impl Iterator<Item = (&NaiveDate, &PriceBar)> {
        self.bars.range(..=until)
    }

    /// Known closing prices on or before `until`, ascending.
    pub fn closes_until(&self, until: NaiveDate) -> Vec<f64> {
        self.bars_until(until)
            .filter_map(|(_, bar)| bar.close)
            .collect()
    }
}
