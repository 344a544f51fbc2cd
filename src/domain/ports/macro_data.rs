use crate::domain::entities::indicator_series::IndicatorSeries;
use crate::domain::error::DomainError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Dated scalar series for macroeconomic indicators (FRED ids and the like).
#[async_trait]
pub trait MacroIndicatorSource: Send + Sync {
    async fn series(
        &self,
        indicator_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<IndicatorSeries, DomainError>;
}
