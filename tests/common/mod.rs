//! Shared test helpers: in-memory storage and canned upstream sources.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Days, NaiveDate, TimeZone, Utc};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stockgpt::domain::entities::basic_info::BasicInfo;
use stockgpt::domain::entities::indicator_series::IndicatorSeries;
use stockgpt::domain::entities::news_item::NewsItem;
use stockgpt::domain::entities::price_series::{PriceBar, PriceSeries};
use stockgpt::domain::error::DomainError;
use stockgpt::domain::ports::macro_data::MacroIndicatorSource;
use stockgpt::domain::ports::market_data::{BasicInfoSource, MarketDataSource};
use stockgpt::domain::ports::news_source::NewsSource;
use stockgpt::domain::ports::repository::{Repositories, Repository};
use stockgpt::domain::ports::Sources;
use stockgpt::infrastructure::indicators::IndicatorRegistry;
use stockgpt::{sqlite_repositories, DefaultIndicators, StockGpt};

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A steadily rising daily series over `[from, to]`.
pub fn rising_series(symbol: &str, from: NaiveDate, to: NaiveDate) -> PriceSeries {
    let mut series = PriceSeries::new(symbol);
    let mut date = from;
    let mut price = 100.0;
    while date <= to {
        series
            .bars
            .insert(date, PriceBar::ohlcv(price, price + 1.0, price - 1.0, price + 0.5, 1000.0));
        price += 0.5;
        date = date + Days::new(1);
    }
    series
}

pub fn news_item(title: &str, url: &str, published: NaiveDate) -> NewsItem {
    NewsItem {
        title: title.into(),
        source: "Stub Wire".into(),
        published_at: Utc.from_utc_datetime(&published.and_hms_opt(12, 0, 0).unwrap()),
        url: url.into(),
        summary: None,
    }
}

#[derive(Default)]
pub struct StubMarketData {
    pub calls: AtomicUsize,
}

#[async_trait]
impl MarketDataSource for StubMarketData {
    async fn daily_bars(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceSeries, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if symbol == "MISSING" {
            return Err(DomainError::Upstream("No data found, symbol may be delisted".into()));
        }
        Ok(rising_series(symbol, from, to))
    }
}

pub struct StubBasicInfo;

#[async_trait]
impl BasicInfoSource for StubBasicInfo {
    async fn basic_info(&self, symbol: &str) -> Result<BasicInfo, DomainError> {
        Ok(BasicInfo {
            name: Some(format!("{symbol} Incorporated")),
            sectors: vec!["Technology".into()],
            market_cap: Some(1_000_000.0),
            ..BasicInfo::default()
        })
    }
}

/// Ids containing `BAD` fail; everything else returns two observations.
pub struct StubMacro;

#[async_trait]
impl MacroIndicatorSource for StubMacro {
    async fn series(
        &self,
        indicator_id: &str,
        _from: Option<NaiveDate>,
        _to: Option<NaiveDate>,
    ) -> Result<IndicatorSeries, DomainError> {
        if indicator_id.contains("BAD") {
            return Err(DomainError::Upstream(format!("Bad Request for {indicator_id}")));
        }
        Ok([(d("2024-01-01"), Some(3.7)), (d("2024-02-01"), None)]
            .into_iter()
            .collect())
    }
}

/// Articles published on the days before `reference`.
pub struct StubNews {
    pub reference: NaiveDate,
}

#[async_trait]
impl NewsSource for StubNews {
    async fn latest(
        &self,
        symbol: &str,
        page_size: u32,
        _page: u32,
    ) -> Result<Vec<NewsItem>, DomainError> {
        Ok((1..=page_size.min(3))
            .map(|i| {
                news_item(
                    &format!("{symbol} headline {i}"),
                    &format!("https://news.example/{symbol}/{i}"),
                    self.reference - Days::new(u64::from(i)),
                )
            })
            .collect())
    }
}

pub struct Harness {
    pub app: StockGpt,
    pub repos: Repositories,
    pub market_data: Arc<StubMarketData>,
}

pub fn sources(news_reference: NaiveDate) -> (Sources, Arc<StubMarketData>) {
    let market_data = Arc::new(StubMarketData::default());
    let sources = Sources {
        market_data: market_data.clone(),
        basic_info: Arc::new(StubBasicInfo),
        macro_data: Arc::new(StubMacro),
        news: Arc::new(StubNews {
            reference: news_reference,
        }),
    };
    (sources, market_data)
}

pub fn defaults() -> DefaultIndicators {
    DefaultIndicators {
        market: vec!["UNRATE".into(), "DGS10".into()],
        stock: vec!["RSI".into(), "SMA50".into(), "NOT_AN_INDICATOR".into()],
    }
}

/// In-memory SQLite storage with stub sources.
pub fn setup() -> Harness {
    setup_with_news_reference(stockgpt::today())
}

pub fn setup_with_news_reference(reference: NaiveDate) -> Harness {
    let repos = sqlite_repositories(":memory:").unwrap();
    let (sources, market_data) = sources(reference);
    let app = StockGpt::with_providers(
        repos.clone(),
        sources,
        IndicatorRegistry::builtin(),
        defaults(),
    );
    Harness {
        app,
        repos,
        market_data,
    }
}

/// A repository that fails every call.
pub struct Unreachable;

impl<T> Repository<T> for Unreachable {
    fn list_keys(&self) -> Result<BTreeSet<String>, DomainError> {
        Err(DomainError::Storage("repository accessed".into()))
    }

    fn get(&self, _key: &str) -> Result<Option<T>, DomainError> {
        Err(DomainError::Storage("repository accessed".into()))
    }

    fn store(&self, _key: &str, _value: &T) -> Result<(), DomainError> {
        Err(DomainError::Storage("repository accessed".into()))
    }
}

pub fn unreachable_repositories() -> Repositories {
    Repositories {
        prices: Arc::new(Unreachable),
        market_indicators: Arc::new(Unreachable),
        stock_indicators: Arc::new(Unreachable),
        news: Arc::new(Unreachable),
    }
}
