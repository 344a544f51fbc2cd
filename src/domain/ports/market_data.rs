use crate::domain::entities::basic_info::BasicInfo;
use crate::domain::entities::price_series::PriceSeries;
use crate::domain::error::DomainError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Daily OHLCV bars for a symbol.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Bars dated within `[from, to]`. An unknown symbol or provider error is fatal.
    async fn daily_bars(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceSeries, DomainError>;
}

/// Company fundamentals snapshot.
#[async_trait]
pub trait BasicInfoSource: Send + Sync {
    /// Fields the provider does not report are left absent.
    async fn basic_info(&self, symbol: &str) -> Result<BasicInfo, DomainError>;
}
