use crate::domain::error::DomainError;
use crate::domain::ports::macro_data::MacroIndicatorSource;
use crate::domain::ports::repository::MarketIndicatorRepository;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

pub struct UpdateMarketIndicatorsUseCase {
    repo: MarketIndicatorRepository,
    source: Arc<dyn MacroIndicatorSource>,
}

impl UpdateMarketIndicatorsUseCase {
    pub fn new(repo: MarketIndicatorRepository, source: Arc<dyn MacroIndicatorSource>) -> Self {
        Self { repo, source }
    }

    /// Refreshes each indicator in `ids`. A failed fetch is logged and that
    /// indicator skipped; a failed store aborts. Returns the ids stored.
    pub async fn execute(
        &self,
        ids: &[String],
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<String>, DomainError> {
        info!(indicators = ?ids, ?from, ?to, "Collecting indicators");
        let mut stored = Vec::new();
        for id in ids {
            let series = match self.source.series(id, from, to).await {
                Ok(series) => series,
                Err(e) => {
                    warn!(indicator = %id, error = %e, "Could not load indicator, skipping");
                    continue;
                }
            };
            self.repo.store(id, &series)?;
            stored.push(id.clone());
        }
        Ok(stored)
    }
}
