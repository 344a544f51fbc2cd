pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

use crate::application::generate_prompt::{GeneratePromptUseCase, PromptOptions};
use crate::application::update_market_indicators::UpdateMarketIndicatorsUseCase;
use crate::application::update_news::UpdateNewsUseCase;
use crate::application::update_prices::UpdatePricesUseCase;
use crate::application::update_stock_indicators::UpdateStockIndicatorsUseCase;
use crate::config::{AppConfig, StorageBackend};
use crate::domain::error::DomainError;
use crate::domain::ports::repository::Repositories;
use crate::domain::ports::Sources;
use crate::infrastructure::feeds::fred::FredFeed;
use crate::infrastructure::feeds::newsapi::NewsApiFeed;
use crate::infrastructure::feeds::yahoo::YahooFeed;
use crate::infrastructure::files::market_indicator_repo::CsvMarketIndicatorRepo;
use crate::infrastructure::files::news_repo::CsvNewsRepo;
use crate::infrastructure::files::price_repo::CsvPriceRepo;
use crate::infrastructure::files::stock_indicator_repo::CsvStockIndicatorRepo;
use crate::infrastructure::indicators::IndicatorRegistry;
use crate::infrastructure::sqlite;
use crate::infrastructure::sqlite::market_indicator_repo::SqliteMarketIndicatorRepo;
use crate::infrastructure::sqlite::news_repo::SqliteNewsRepo;
use crate::infrastructure::sqlite::price_repo::SqlitePriceRepo;
use crate::infrastructure::sqlite::stock_indicator_repo::SqliteStockIndicatorRepo;
use chrono::NaiveDate;
use std::sync::Arc;

/// Indicator ids used when a command does not name any.
#[derive(Debug, Clone, Default)]
pub struct DefaultIndicators {
    pub market: Vec<String>,
    pub stock: Vec<String>,
}

pub struct StockGpt {
    update_prices_uc: UpdatePricesUseCase,
    update_market_indicators_uc: UpdateMarketIndicatorsUseCase,
    update_stock_indicators_uc: UpdateStockIndicatorsUseCase,
    update_news_uc: UpdateNewsUseCase,
    generate_prompt_uc: GeneratePromptUseCase,
    defaults: DefaultIndicators,
}

impl StockGpt {
    pub fn new(config: &AppConfig) -> Result<Self, DomainError> {
        let repos = match config.storage {
            StorageBackend::Csv => csv_repositories(config)?,
            StorageBackend::Sqlite => sqlite_repositories(&config.db_path.to_string_lossy())?,
        };

        let yahoo = Arc::new(YahooFeed::new());
        let sources = Sources {
            market_data: yahoo.clone(),
            basic_info: yahoo,
            macro_data: Arc::new(FredFeed::new(config.fred_api_key.clone())),
            news: Arc::new(NewsApiFeed::new(config.news_api_key.clone())),
        };

        Ok(Self::with_providers(
            repos,
            sources,
            IndicatorRegistry::builtin(),
            DefaultIndicators {
                market: config.default_market_indicators.clone(),
                stock: config.default_stock_indicators.clone(),
            },
        ))
    }

    pub fn with_providers(
        repos: Repositories,
        sources: Sources,
        registry: IndicatorRegistry,
        defaults: DefaultIndicators,
    ) -> Self {
        let registry = Arc::new(registry);
        Self {
            update_prices_uc: UpdatePricesUseCase::new(repos.prices.clone(), sources.market_data.clone()),
            update_market_indicators_uc: UpdateMarketIndicatorsUseCase::new(
                repos.market_indicators.clone(),
                sources.macro_data.clone(),
            ),
            update_stock_indicators_uc: UpdateStockIndicatorsUseCase::new(
                repos.prices.clone(),
                repos.stock_indicators.clone(),
                registry.clone(),
            ),
            update_news_uc: UpdateNewsUseCase::new(
                repos.news.clone(),
                repos.prices.clone(),
                sources.news.clone(),
            ),
            generate_prompt_uc: GeneratePromptUseCase::new(repos, sources, registry, defaults.stock.clone()),
            defaults,
        }
    }

    pub async fn collect_symbols(
        &self,
        symbols: &[String],
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<String>, DomainError> {
        self.update_prices_uc.execute(symbols, from, to, today()).await
    }

    /// Updates `ids`, or the configured defaults when empty.
    pub async fn update_market_indicators(
        &self,
        ids: &[String],
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<String>, DomainError> {
        let ids = if ids.is_empty() { &self.defaults.market[..] } else { ids };
        self.update_market_indicators_uc.execute(ids, from, to).await
    }

    pub fn update_stock_indicators(&self) -> Result<Vec<String>, DomainError> {
        self.update_stock_indicators_uc.execute(&self.defaults.stock)
    }

    pub async fn update_news(&self, symbols: &[String], page_size: u32) -> Result<Vec<String>, DomainError> {
        self.update_news_uc.execute(symbols, page_size).await
    }

    pub async fn generate_prompt(&self, symbol: &str, options: &PromptOptions) -> Result<String, DomainError> {
        self.generate_prompt_uc.execute(symbol, options, today()).await
    }
}

/// The local calendar date.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn csv_repositories(config: &AppConfig) -> Result<Repositories, DomainError> {
    Ok(Repositories {
        prices: Arc::new(CsvPriceRepo::new(&config.stock_value_dir())?),
        market_indicators: Arc::new(CsvMarketIndicatorRepo::new(&config.market_indicator_dir())?),
        stock_indicators: Arc::new(CsvStockIndicatorRepo::new(&config.stock_indicator_dir())?),
        news: Arc::new(CsvNewsRepo::new(&config.news_article_dir())?),
    })
}

/// One connection per collection. With `:memory:` each collection gets its
/// own private database.
pub fn sqlite_repositories(db_path: &str) -> Result<Repositories, DomainError> {
    Ok(Repositories {
        prices: Arc::new(SqlitePriceRepo::new(sqlite::open(db_path)?)),
        market_indicators: Arc::new(SqliteMarketIndicatorRepo::new(sqlite::open(db_path)?)),
        stock_indicators: Arc::new(SqliteStockIndicatorRepo::new(sqlite::open(db_path)?)),
        news: Arc::new(SqliteNewsRepo::new(sqlite::open(db_path)?)),
    })
}
