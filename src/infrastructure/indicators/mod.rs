//! Technical indicators computed from a stored price series, looked up by id.

pub mod technical;

use crate::domain::entities::price_series::PriceSeries;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Value of one indicator for `date`, using only bars dated on or before it.
/// `None` when the history is too short.
pub type IndicatorFn = fn(&PriceSeries, NaiveDate) -> Option<f64>;

#[derive(Clone, Default)]
pub struct IndicatorRegistry {
    indicators: BTreeMap<&'static str, IndicatorFn>,
}

impl IndicatorRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every indicator this crate knows how to compute.
    pub fn builtin() -> Self {
        use technical::*;

        let mut registry = Self::empty();
        registry.register("SMA50", sma50);
        registry.register("SMA200", sma200);
        registry.register("EMA50", ema50);
        registry.register("EMA200", ema200);
        registry.register("RSI", rsi);
        registry.register("MACD", macd);
        registry.register("MACD_Signal", macd_signal);
        registry.register("MACD_Hist", macd_hist);
        registry.register("BB_Upper", bb_upper);
        registry.register("BB_Middle", bb_middle);
        registry.register("BB_Lower", bb_lower);
        registry.register("SO_SlowK", slow_k);
        registry.register("SO_SlowD", slow_d);
        registry.register("ADX", adx);
        registry.register("Aroon_Oscillator", aroon_oscillator);
        registry.register("OBV", obv);
        registry
    }

    pub fn register(&mut self, id: &'static str, indicator: IndicatorFn) {
        self.indicators.insert(id, indicator);
    }

    pub fn get(&self, id: &str) -> Option<IndicatorFn> {
        self.indicators.get(id).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.indicators.keys().copied()
    }
}
