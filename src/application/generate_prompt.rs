use crate::application::render::render_prompt;
use crate::application::update_news::{UpdateNewsUseCase, DEFAULT_PAGE_SIZE};
use crate::application::update_prices::UpdatePricesUseCase;
use crate::application::update_stock_indicators::UpdateStockIndicatorsUseCase;
use crate::domain::entities::prompt_context::PromptContext;
use crate::domain::error::DomainError;
use crate::domain::ports::repository::Repositories;
use crate::domain::ports::Sources;
use crate::domain::selection::{indicator_window, recent_values, select_news, select_prices};
use crate::infrastructure::indicators::IndicatorRegistry;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct PromptOptions {
    /// Defaults to today.
    pub as_of: Option<NaiveDate>,
    pub market_indicators_max_value_count: usize,
    pub stock_indicators_max_age: u32,
    pub stock_values_max_age: u32,
    pub max_news_age: u32,
    pub max_news_count: usize,
    /// Refresh prices, news and indicators for the symbol first.
    pub refresh: bool,
    /// Seeds the news shuffle; random when `None`.
    pub news_seed: Option<u64>,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            as_of: None,
            market_indicators_max_value_count: 3,
            stock_indicators_max_age: 3,
            stock_values_max_age: 31,
            max_news_age: 7,
            max_news_count: 7,
            refresh: false,
            news_seed: None,
        }
    }
}

pub struct GeneratePromptUseCase {
    repos: Repositories,
    sources: Sources,
    update_prices: UpdatePricesUseCase,
    update_news: UpdateNewsUseCase,
    update_stock_indicators: UpdateStockIndicatorsUseCase,
    stock_indicator_ids: Vec<String>,
}

impl GeneratePromptUseCase {
    pub fn new(
        repos: Repositories,
        sources: Sources,
        registry: Arc<IndicatorRegistry>,
        stock_indicator_ids: Vec<String>,
    ) -> Self {
        Self {
            update_prices: UpdatePricesUseCase::new(
                repos.prices.clone(),
                sources.market_data.clone(),
            ),
            update_news: UpdateNewsUseCase::new(
                repos.news.clone(),
                repos.prices.clone(),
                sources.news.clone(),
            ),
            update_stock_indicators: UpdateStockIndicatorsUseCase::new(
                repos.prices.clone(),
                repos.stock_indicators.clone(),
                registry,
            ),
            repos,
            sources,
            stock_indicator_ids,
        }
    }

    pub async fn execute(
        &self,
        symbol: &str,
        options: &PromptOptions,
        today: NaiveDate,
    ) -> Result<String, DomainError> {
        let as_of = options.as_of.unwrap_or(today);
        if as_of > today {
            return Err(DomainError::InvalidInput(format!(
                "Date {as_of} lies in the future"
            )));
        }
        let symbol = symbol.trim().to_uppercase();

        if options.refresh {
            info!(symbol = %symbol, "Updating stock symbol data");
            let symbols = [symbol.clone()];
            self.update_prices.execute(&symbols, None, None, today).await?;
            self.update_news.execute(&symbols, DEFAULT_PAGE_SIZE).await?;
            self.update_stock_indicators
                .execute_for(&symbol, &self.stock_indicator_ids)?;
        }

        let context = self.gather(&symbol, as_of, options).await?;
        Ok(render_prompt(&context))
    }

    async fn gather(
        &self,
        symbol: &str,
        as_of: NaiveDate,
        options: &PromptOptions,
    ) -> Result<PromptContext, DomainError> {
        info!(symbol, "Gathering stock values");
        let series = self
            .repos
            .prices
            .get(symbol)?
            .ok_or_else(|| DomainError::NotFound(format!("No data for symbol {symbol}")))?;
        let prices = select_prices(&series, as_of, options.stock_values_max_age);

        info!("Gathering market indicators");
        let mut market_indicators = Vec::new();
        for id in self.repos.market_indicators.list_keys()? {
            let values = match self.repos.market_indicators.get(&id)? {
                Some(series) => recent_values(&series, as_of, options.market_indicators_max_value_count),
                None => Vec::new(),
            };
            market_indicators.push((id, values));
        }

        info!(symbol, "Gathering stock indicators");
        let table = self.repos.stock_indicators.get(symbol)?.ok_or_else(|| {
            DomainError::NotFound(format!("No stock indicators for symbol {symbol}"))
        })?;
        let stock_indicators = indicator_window(&table, as_of, options.stock_indicators_max_age);

        info!(symbol, "Fetching basic stock information");
        let basic_info = self.sources.basic_info.basic_info(symbol).await?;

        info!(symbol, "Fetching news");
        let stored_news = self.repos.news.get(symbol)?.unwrap_or_default();
        let news = match options.news_seed {
            Some(seed) => select_news(
                &stored_news,
                as_of,
                options.max_news_age,
                options.max_news_count,
                &mut StdRng::seed_from_u64(seed),
            ),
            None => select_news(
                &stored_news,
                as_of,
                options.max_news_age,
                options.max_news_count,
                &mut rand::thread_rng(),
            ),
        };

        Ok(PromptContext {
            symbol: symbol.to_string(),
            as_of,
            basic_info,
            prices,
            market_indicators,
            stock_indicators,
            news,
        })
    }
}
