use crate::domain::error::DomainError;
use crate::domain::ports::market_data::MarketDataSource;
use crate::domain::ports::repository::PriceRepository;
use crate::domain::selection::days_before;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

/// Days of history fetched when no start date is given.
pub const DEFAULT_HISTORY_DAYS: u32 = 365;

pub struct UpdatePricesUseCase {
    prices: PriceRepository,
    market_data: Arc<dyn MarketDataSource>,
}

impl UpdatePricesUseCase {
    pub fn new(prices: PriceRepository, market_data: Arc<dyn MarketDataSource>) -> Self {
        Self {
            prices,
            market_data,
        }
    }

    /// Fetches and stores bars for `symbols` (every stored symbol when empty).
    /// Any fetch failure aborts the run; symbols stored before it stay stored.
    pub async fn execute(
        &self,
        symbols: &[String],
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Vec<String>, DomainError> {
        let symbols: Vec<String> = if symbols.is_empty() {
            self.prices.list_keys()?.into_iter().collect()
        } else {
            symbols.iter().map(|s| s.trim().to_uppercase()).collect()
        };
        if symbols.is_empty() {
            warn!("No symbols given and none stored yet");
            return Ok(symbols);
        }

        let to = to.unwrap_or(today);
        let from = from.unwrap_or_else(|| days_before(to, DEFAULT_HISTORY_DAYS));
        if from > to {
            return Err(DomainError::InvalidInput(format!(
                "Start date {from} is after end date {to}"
            )));
        }

        for symbol in &symbols {
            info!(symbol = %symbol, %from, %to, "Collecting data");
            let series = self.market_data.daily_bars(symbol, from, to).await?;
            self.prices.store(symbol, &series)?;
        }
        Ok(symbols)
    }
}
