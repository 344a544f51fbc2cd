use crate::domain::error::DomainError;
use crate::domain::ports::news_source::NewsSource;
use crate::domain::ports::repository::{NewsRepository, PriceRepository};
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_PAGE_SIZE: u32 = 15;

pub struct UpdateNewsUseCase {
    news: NewsRepository,
    prices: PriceRepository,
    source: Arc<dyn NewsSource>,
}

impl UpdateNewsUseCase {
    pub fn new(news: NewsRepository, prices: PriceRepository, source: Arc<dyn NewsSource>) -> Self {
        Self {
            news,
            prices,
            source,
        }
    }

    /// Stores the first page of latest articles for each symbol (every symbol
    /// with stored prices when `symbols` is empty).
    pub async fn execute(
        &self,
        symbols: &[String],
        page_size: u32,
    ) -> Result<Vec<String>, DomainError> {
        if page_size == 0 {
            return Err(DomainError::InvalidInput("Page size must be positive".into()));
        }
        let symbols: Vec<String> = if symbols.is_empty() {
            self.prices.list_keys()?.into_iter().collect()
        } else {
            symbols.iter().map(|s| s.trim().to_uppercase()).collect()
        };
        if symbols.is_empty() {
            warn!("No symbols given and none stored yet");
        }

        for symbol in &symbols {
            info!(symbol = %symbol, "Collecting news");
            let articles = self.source.latest(symbol, page_size, 1).await?;
            self.news.store(symbol, &articles)?;
        }
        Ok(symbols)
    }
}
