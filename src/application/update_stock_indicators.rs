use crate::domain::entities::indicator_table::IndicatorTable;
use crate::domain::entities::price_series::PriceSeries;
use crate::domain::error::DomainError;
use crate::domain::ports::repository::{PriceRepository, StockIndicatorRepository};
use crate::infrastructure::indicators::{IndicatorFn, IndicatorRegistry};
use std::sync::Arc;
use tracing::{info, warn};

pub struct UpdateStockIndicatorsUseCase {
    prices: PriceRepository,
    stock_indicators: StockIndicatorRepository,
    registry: Arc<IndicatorRegistry>,
}

impl UpdateStockIndicatorsUseCase {
    pub fn new(
        prices: PriceRepository,
        stock_indicators: StockIndicatorRepository,
        registry: Arc<IndicatorRegistry>,
    ) -> Self {
        Self {
            prices,
            stock_indicators,
            registry,
        }
    }

    /// Recomputes `ids` for every stored symbol. Returns the symbols updated.
    pub fn execute(&self, ids: &[String]) -> Result<Vec<String>, DomainError> {
        info!("Updating stock indicators for all stored symbols");
        let indicators = self.resolve(ids);
        let mut updated = Vec::new();
        for symbol in self.prices.list_keys()? {
            if let Some(series) = self.prices.get(&symbol)? {
                self.store_table(&symbol, &series, &indicators)?;
                updated.push(symbol);
            }
        }
        Ok(updated)
    }

    /// Recomputes `ids` for one symbol from its stored prices.
    pub fn execute_for(&self, symbol: &str, ids: &[String]) -> Result<(), DomainError> {
        let series = self
            .prices
            .get(symbol)?
            .ok_or_else(|| DomainError::NotFound(format!("No data for symbol {symbol}")))?;
        let indicators = self.resolve(ids);
        self.store_table(symbol, &series, &indicators)
    }

    /// Registered indicators among `ids`; unknown ids are logged and dropped.
    fn resolve<'a>(&self, ids: &'a [String]) -> Vec<(&'a str, IndicatorFn)> {
        ids.iter()
            .filter_map(|id| match self.registry.get(id) {
                Some(indicator) => Some((id.as_str(), indicator)),
                None => {
                    warn!(indicator = %id, "Unknown stock indicator, skipping");
                    None
                }
            })
            .collect()
    }

    fn store_table(
        &self,
        symbol: &str,
        series: &PriceSeries,
        indicators: &[(&str, IndicatorFn)],
    ) -> Result<(), DomainError> {
        info!(symbol, count = indicators.len(), "Computing stock indicators");
        let table = compute_table(series, indicators);
        self.stock_indicators.store(symbol, &table)
    }
}

/// One row per bar date, one column per indicator.
pub fn compute_table(series: &PriceSeries, indicators: &[(&str, IndicatorFn)]) -> IndicatorTable {
    let mut table = IndicatorTable::new();
    for id in indicators.iter().map(|(id, _)| id) {
        table.columns.push(id.to_string());
    }
    for date in series.bars.keys() {
        for (id, indicator) in indicators {
            table.set(*date, id, indicator(series, *date));
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::price_series::PriceBar;
    use chrono::NaiveDate;

    fn close(series: &PriceSeries, date: NaiveDate) -> Option<f64> {
        series.bars.get(&date).and_then(|b| b.close)
    }

    #[test]
    fn test_compute_table_per_date() {
        let mut series = PriceSeries::new("ACME");
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        series.bars.insert(d1, PriceBar::ohlcv(1.0, 2.0, 0.5, 1.5, 10.0));
        series.bars.insert(d2, PriceBar::new(None, None, None, None, None));

        let table = compute_table(&series, &[("CLOSE", close as IndicatorFn)]);
        assert_eq!(table.columns, vec!["CLOSE"]);
        assert_eq!(table.get(d1, "CLOSE"), Some(1.5));
        assert_eq!(table.row(d2), vec![("CLOSE", None)]);
    }
}
