use crate::domain::entities::basic_info::BasicInfo;
use crate::domain::entities::news_item::NewsItem;
use crate::domain::entities::price_series::PriceBar;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Everything the renderer needs for one prompt. Built per call, never stored.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub basic_info: BasicInfo,
    /// Ascending by date.
    pub prices: BTreeMap<NaiveDate, PriceBar>,
    /// Per indicator id (sorted), values most-recent-first.
    pub market_indicators: Vec<(String, Vec<(NaiveDate, Option<f64>)>)>,
    /// Per date ascending, `(indicator, value)` in column order.
    pub stock_indicators: Vec<(NaiveDate, Vec<(String, Option<f64>)>)>,
    pub news: Vec<NewsItem>,
}
