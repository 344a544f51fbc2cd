//! Storage port shared by every persisted collection.
//!
//! A repository holds one record per key (a symbol or a macro indicator id).
//! Adapters live under `infrastructure::files` and `infrastructure::sqlite`.

use crate::domain::entities::indicator_series::IndicatorSeries;
use crate::domain::entities::indicator_table::IndicatorTable;
use crate::domain::entities::news_item::NewsItem;
use crate::domain::entities::price_series::PriceSeries;
use crate::domain::error::DomainError;
use std::collections::BTreeSet;
use std::sync::Arc;

pub trait Repository<T>: Send + Sync {
    /// Every key with persisted data.
    fn list_keys(&self) -> Result<BTreeSet<String>, DomainError>;

    /// The full record for `key`, or `None` when nothing is stored yet.
    fn get(&self, key: &str) -> Result<Option<T>, DomainError>;

    /// Upserts `value` into the stored record, creating it when absent. Rows
    /// are deduplicated by their natural key with `value` winning conflicts.
    fn store(&self, key: &str, value: &T) -> Result<(), DomainError>;
}

pub type PriceRepository = Arc<dyn Repository<PriceSeries>>;
pub type MarketIndicatorRepository = Arc<dyn Repository<IndicatorSeries>>;
pub type StockIndicatorRepository = Arc<dyn Repository<IndicatorTable>>;
pub type NewsRepository = Arc<dyn Repository<Vec<NewsItem>>>;

/// The four collections a prompt draws from.
#[derive(Clone)]
pub struct Repositories {
    pub prices: PriceRepository,
    pub market_indicators: MarketIndicatorRepository,
    pub stock_indicators: StockIndicatorRepository,
    pub news: NewsRepository,
}
