use super::{get_json, http_client, FeedError};
use crate::domain::entities::basic_info::BasicInfo;
use crate::domain::entities::price_series::{PriceBar, PriceSeries};
use crate::domain::error::DomainError;
use crate::domain::ports::market_data::{BasicInfoSource, MarketDataSource};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use tracing::{info, warn};

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Yahoo Finance daily bars and fundamentals via the v8 chart API (no auth required).
pub struct YahooFeed {
    client: reqwest::Client,
}

impl YahooFeed {
    pub fn new() -> Self {
        Self {
            client: http_client(),
        }
    }
}

impl Default for YahooFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, serde::Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, serde::Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
struct ChartData {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    gmtoffset: Option<i64>,
    #[serde(default)]
    fifty_two_week_high: Option<f64>,
    #[serde(default)]
    fifty_two_week_low: Option<f64>,
}

#[derive(Debug, serde::Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn first_result(response: ChartResponse, symbol: &str) -> Result<ChartData, FeedError> {
    if let Some(err) = response.chart.error.filter(|e| !e.is_null()) {
        return Err(FeedError::Parse(format!("Yahoo error for {symbol}: {err}")));
    }
    response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FeedError::Parse(format!("No chart results for {symbol}")))
}

/// Turns a chart payload into daily bars, dating each bar in the exchange's
/// local time. Missing quote entries become unknown fields.
fn parse_chart(response: ChartResponse, symbol: &str) -> Result<PriceSeries, FeedError> {
    let data = first_result(response, symbol)?;
    let offset = data.meta.gmtoffset.unwrap_or(0);
    let quote = data
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .unwrap_or_default();

    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();
    let mut series = PriceSeries::new(symbol);
    for (i, ts) in data.timestamp.iter().enumerate() {
        let date = DateTime::from_timestamp(ts + offset, 0)
            .ok_or_else(|| FeedError::Parse(format!("Invalid timestamp {ts}")))?
            .date_naive();
        let bar = PriceBar::new(
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            at(&quote.close, i),
            at(&quote.volume, i),
        );
        series.bars.insert(date, bar);
    }
    Ok(series)
}

fn raw_number(summary: &serde_json::Value, pointer: &str) -> Option<f64> {
    summary
        .pointer(pointer)
        .and_then(|v| v.get("raw").unwrap_or(v).as_f64())
}

/// Fills the fundamentals the chart metadata lacks from a quoteSummary payload.
fn apply_quote_summary(info: &mut BasicInfo, summary: &serde_json::Value) {
    let result = summary
        .pointer("/quoteSummary/result/0")
        .cloned()
        .unwrap_or_default();

    if let Some(name) = result.pointer("/price/longName").and_then(|v| v.as_str()) {
        info.name = Some(name.to_string());
    }
    if let Some(sector) = result.pointer("/assetProfile/sector").and_then(|v| v.as_str()) {
        info.sectors = vec![sector.to_string()];
    }
    info.market_cap = raw_number(&result, "/summaryDetail/marketCap");
    info.pe_ratio = raw_number(&result, "/summaryDetail/trailingPE");
    info.dividend_yield = raw_number(&result, "/summaryDetail/dividendYield");
    info.beta = raw_number(&result, "/summaryDetail/beta");
    info.eps = raw_number(&result, "/defaultKeyStatistics/trailingEps");
}

fn day_start(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[async_trait]
impl MarketDataSource for YahooFeed {
    async fn daily_bars(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceSeries, DomainError> {
        info!(symbol, %from, %to, "Loading stock data");
        let period1 = day_start(from);
        let period2 = day_start(to) + SECONDS_PER_DAY - 1;
        let request = self.client.get(format!("{CHART_URL}/{symbol}")).query(&[
            ("period1", period1.to_string()),
            ("period2", period2.to_string()),
            ("interval", "1d".to_string()),
        ]);

        let response: ChartResponse = get_json(request, "Yahoo").await?;
        Ok(parse_chart(response, symbol)?)
    }
}

#[async_trait]
impl BasicInfoSource for YahooFeed {
    async fn basic_info(&self, symbol: &str) -> Result<BasicInfo, DomainError> {
        let request = self
            .client
            .get(format!("{CHART_URL}/{symbol}"))
            .query(&[("range", "1d"), ("interval", "1d")]);
        let response: ChartResponse = get_json(request, "Yahoo").await?;
        let meta = first_result(response, symbol)?.meta;

        let mut info = BasicInfo {
            name: meta.long_name.or(meta.short_name),
            high_52_week: meta.fifty_two_week_high,
            low_52_week: meta.fifty_two_week_low,
            ..BasicInfo::default()
        };

        let request = self
            .client
            .get(format!("{QUOTE_SUMMARY_URL}/{symbol}"))
            .query(&[(
                "modules",
                "price,assetProfile,summaryDetail,defaultKeyStatistics",
            )]);
        match get_json::<serde_json::Value>(request, "Yahoo").await {
            Ok(summary) => apply_quote_summary(&mut info, &summary),
            Err(e) => warn!(symbol, error = %e, "Fundamentals unavailable, leaving them absent"),
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_chart_bars() {
        let json = serde_json::json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "ACME", "gmtoffset": -18000 },
                    // 2024-01-02 14:30 UTC and 2024-01-03 14:30 UTC
                    "timestamp": [1704205800, 1704292200],
                    "indicators": { "quote": [{
                        "open": [10.0, 11.0],
                        "high": [12.0, null],
                        "low": [9.0, 10.5],
                        "close": [11.0, 11.2],
                        "volume": [1000, 1500]
                    }]}
                }],
                "error": null
            }
        });
        let response: ChartResponse = serde_json::from_value(json).unwrap();

        let series = parse_chart(response, "ACME").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.bars[&d("2024-01-02")],
            PriceBar::ohlcv(10.0, 12.0, 9.0, 11.0, 1000.0)
        );
        let second = series.bars[&d("2024-01-03")];
        assert_eq!(second.high, None);
        assert!(!second.is_complete());
    }

    #[test]
    fn test_chart_error_is_fatal() {
        let json = serde_json::json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        });
        let response: ChartResponse = serde_json::from_value(json).unwrap();
        let err = parse_chart(response, "NOPE").unwrap_err();
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn test_quote_summary_fields() {
        let summary = serde_json::json!({
            "quoteSummary": { "result": [{
                "price": { "longName": "Acme Corporation" },
                "assetProfile": { "sector": "Technology" },
                "summaryDetail": {
                    "marketCap": { "raw": 2.5e12, "fmt": "2.5T" },
                    "trailingPE": { "raw": 31.2 },
                    "beta": { "raw": 1.1 }
                },
                "defaultKeyStatistics": { "trailingEps": { "raw": 6.4 } }
            }]}
        });
        let mut info = BasicInfo::default();
        apply_quote_summary(&mut info, &summary);

        assert_eq!(info.name.as_deref(), Some("Acme Corporation"));
        assert_eq!(info.sectors, vec!["Technology"]);
        assert_eq!(info.market_cap, Some(2.5e12));
        assert_eq!(info.pe_ratio, Some(31.2));
        assert_eq!(info.dividend_yield, None);
        assert_eq!(info.eps, Some(6.4));
    }
}
