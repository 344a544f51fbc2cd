mod common;

use chrono::Days;
use common::*;
use stockgpt::application::generate_prompt::PromptOptions;
use stockgpt::domain::entities::indicator_series::IndicatorSeries;
use stockgpt::domain::entities::indicator_table::IndicatorTable;
use stockgpt::domain::error::DomainError;
use stockgpt::infrastructure::indicators::IndicatorRegistry;
use stockgpt::StockGpt;
use std::sync::atomic::Ordering;

fn options_on(day: &str) -> PromptOptions {
    PromptOptions {
        as_of: Some(d(day)),
        news_seed: Some(42),
        ..PromptOptions::default()
    }
}

fn seed_symbol(h: &Harness, symbol: &str) {
    let series = rising_series(symbol, d("2023-11-01"), d("2024-01-31"));
    h.repos.prices.store(symbol, &series).unwrap();

    let mut table = IndicatorTable::new();
    for day in ["2024-01-28", "2024-01-29", "2024-01-30", "2024-01-31"] {
        table.set(d(day), "RSI", Some(61.234));
        table.set(d(day), "SMA50", None);
    }
    h.repos.stock_indicators.store(symbol, &table).unwrap();

    let unrate: IndicatorSeries = [
        (d("2023-10-01"), Some(3.8)),
        (d("2023-11-01"), Some(3.7)),
        (d("2023-12-01"), Some(3.7)),
        (d("2024-01-01"), Some(3.9)),
        (d("2024-02-01"), Some(4.0)),
    ]
    .into_iter()
    .collect();
    h.repos.market_indicators.store("UNRATE", &unrate).unwrap();
    h.repos
        .market_indicators
        .store("EMPTY", &IndicatorSeries::new())
        .unwrap();
}

#[tokio::test]
async fn test_prompt_without_news_has_placeholder() {
    let h = setup();
    seed_symbol(&h, "ACME");

    let prompt = h.app.generate_prompt("ACME", &options_on("2024-01-31")).await.unwrap();

    assert!(prompt.starts_with("Today is: 2024-01-31\n"));
    assert!(prompt.contains("- name: ACME Incorporated\n"));
    assert_eq!(prompt.matches("- No news available\n").count(), 1);
    // market indicators: sorted ids, 3 most recent at or before the date
    assert!(prompt.contains(
        "- EMPTY: []\n- UNRATE: [(2024-01-01: 3.90),(2023-12-01: 3.70),(2023-11-01: 3.70)]\n"
    ));
    assert!(prompt.contains("- 2024-01-28: [(RSI: 61.23)]\n"));
    assert!(!prompt.contains("2024-01-27: [("));
    // sampled history before the dense window, then every day of the window
    assert!(prompt.contains("2023-11-15: ("));
    assert!(!prompt.contains("2023-11-16: ("));
    assert!(prompt.contains("2023-12-31: ("));
    assert!(prompt.contains("2024-01-31: ("));
    assert_eq!(h.market_data.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_news_selection_in_prompt() {
    let h = setup();
    seed_symbol(&h, "ACME");
    let items = vec![
        news_item("Acme rallies", "https://n/1", d("2024-01-30")),
        news_item("Acme rallies", "https://n/2", d("2024-01-29")),
        news_item("Acme files 10-K", "https://n/3", d("2024-01-25")),
        news_item("Old story", "https://n/4", d("2024-01-10")),
    ];
    h.repos.news.store("ACME", &items).unwrap();

    let prompt = h.app.generate_prompt("ACME", &options_on("2024-01-31")).await.unwrap();

    assert_eq!(prompt.matches("`Acme rallies`").count(), 1);
    assert!(prompt.contains("- 2024-01-25: `Acme files 10-K`\n(Source: Stub Wire)\n"));
    assert!(!prompt.contains("Old story"));
    assert!(!prompt.contains("No news available"));

    let again = h.app.generate_prompt("ACME", &options_on("2024-01-31")).await.unwrap();
    assert_eq!(prompt, again);

    let capped = PromptOptions {
        max_news_count: 1,
        ..options_on("2024-01-31")
    };
    let prompt = h.app.generate_prompt("ACME", &capped).await.unwrap();
    assert_eq!(prompt.matches("(Source: Stub Wire)").count(), 1);
}

#[tokio::test]
async fn test_future_date_rejected_before_data_access() {
    let (sources, market_data) = sources(stockgpt::today());
    let app = StockGpt::with_providers(
        unreachable_repositories(),
        sources,
        IndicatorRegistry::builtin(),
        defaults(),
    );
    let options = PromptOptions {
        as_of: Some(stockgpt::today() + Days::new(1)),
        refresh: true,
        ..PromptOptions::default()
    };

    let err = app.generate_prompt("ACME", &options).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
    assert_eq!(market_data.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_prices_are_fatal() {
    let h = setup();
    let err = h
        .app
        .generate_prompt("NOPE", &options_on("2024-01-31"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(msg) if msg.contains("NOPE")));
}

#[tokio::test]
async fn test_missing_indicator_table_is_fatal() {
    let h = setup();
    let series = rising_series("ACME", d("2024-01-01"), d("2024-01-31"));
    h.repos.prices.store("ACME", &series).unwrap();

    let err = h
        .app
        .generate_prompt("ACME", &options_on("2024-01-31"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(msg) if msg.contains("stock indicators")));
}

#[tokio::test]
async fn test_refresh_then_generate() {
    let h = setup();
    let options = PromptOptions {
        refresh: true,
        news_seed: Some(1),
        ..PromptOptions::default()
    };

    let prompt = h.app.generate_prompt("acme", &options).await.unwrap();

    assert_eq!(h.market_data.calls.load(Ordering::SeqCst), 1);
    assert!(prompt.contains("stock `ACME`"));
    assert!(prompt.contains("(RSI: "));
    assert!(prompt.contains("(SMA50: "));
    assert!(prompt.contains("`ACME headline 1`"));

    let table = h.repos.stock_indicators.get("ACME").unwrap().unwrap();
    assert_eq!(table.columns, vec!["RSI", "SMA50"]);
    assert!(h.repos.news.get("ACME").unwrap().unwrap().len() == 3);
}

#[tokio::test]
async fn test_refresh_failure_emits_no_prompt() {
    let h = setup();
    let options = PromptOptions {
        refresh: true,
        ..PromptOptions::default()
    };
    let err = h.app.generate_prompt("MISSING", &options).await.unwrap_err();
    assert!(matches!(err, DomainError::Upstream(_)));
    assert!(h.repos.news.get("MISSING").unwrap().is_none());
}
