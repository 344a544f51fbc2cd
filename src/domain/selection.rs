//! Recency and sampling policies deciding which stored points reach a prompt.
//!
//! Every function here is a pure function of its inputs and the as-of date.

use crate::domain::entities::indicator_series::IndicatorSeries;
use crate::domain::entities::indicator_table::IndicatorTable;
use crate::domain::entities::news_item::NewsItem;
use crate::domain::entities::price_series::{PriceBar, PriceSeries};
use chrono::{Datelike, Days, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashSet};

/// `date - days`, saturating at the earliest representable date.
pub fn days_before(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Complete bars dated within `[from, to]`. Bars with any unknown field are
/// dropped entirely.
pub fn exact_window(
    series: &PriceSeries,
    from: NaiveDate,
    to: NaiveDate,
) -> BTreeMap<NaiveDate, PriceBar> {
    if from > to {
        return BTreeMap::new();
    }
    series
        .bars
        .range(from..=to)
        .filter(|(_, bar)| bar.is_complete())
        .map(|(date, bar)| (*date, *bar))
        .collect()
}

/// Bars strictly before `cutoff` falling on the 1st or 15th of a month,
/// complete or not.
pub fn sample_bimonthly(series: &PriceSeries, cutoff: NaiveDate) -> BTreeMap<NaiveDate, PriceBar> {
    series
        .bars
        .range(..cutoff)
        .filter(|(date, _)| matches!(date.day(), 1 | 15))
        .map(|(date, bar)| (*date, *bar))
        .collect()
}

/// Sparse bi-monthly history before the dense window, overlaid by the dense
/// window `[as_of - max_age_days, as_of]`. Windowed bars win on shared dates.
pub fn select_prices(
    series: &PriceSeries,
    as_of: NaiveDate,
    max_age_days: u32,
) -> BTreeMap<NaiveDate, PriceBar> {
    let window_start = days_before(as_of, max_age_days);
    let mut selected = sample_bimonthly(series, window_start);
    selected.extend(exact_window(series, window_start, as_of));
    selected
}

/// At most `cap` values dated on or before `as_of`, most recent first.
pub fn recent_values(
    series: &IndicatorSeries,
    as_of: NaiveDate,
    cap: usize,
) -> Vec<(NaiveDate, Option<f64>)> {
    series
        .values
        .range(..=as_of)
        .rev()
        .take(cap)
        .map(|(date, value)| (*date, *value))
        .collect()
}

/// Table rows dated within `[as_of - max_age_days, as_of]`, ascending, each
/// with all indicator values present on that date.
pub fn indicator_window(
    table: &IndicatorTable,
    as_of: NaiveDate,
    max_age_days: u32,
) -> Vec<(NaiveDate, Vec<(String, Option<f64>)>)> {
    let from = days_before(as_of, max_age_days);
    if from > as_of {
        return Vec::new();
    }
    table
        .rows
        .range(from..=as_of)
        .map(|(date, _)| {
            let row = table
                .row(*date)
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect();
            (*date, row)
        })
        .collect()
}

/// News published within `[as_of - max_age_days, as_of]`, first occurrence per
/// title, shuffled with `rng` and cut to `max_count`.
///
/// The shuffle decides which headlines surface when more qualify than
/// `max_count`; pass a seeded RNG for reproducible prompts.
pub fn select_news<R: Rng + ?Sized>(
    items: &[NewsItem],
    as_of: NaiveDate,
    max_age_days: u32,
    max_count: usize,
    rng: &mut R,
) -> Vec<NewsItem> {
    let from = days_before(as_of, max_age_days);
    let mut seen = HashSet::new();
    let mut selected: Vec<NewsItem> = items
        .iter()
        .filter(|item| {
            let day = item.published_on();
            from <= day && day <= as_of
        })
        .filter(|item| seen.insert(item.title.clone()))
        .cloned()
        .collect();

    selected.shuffle(rng);
    selected.truncate(max_count);
    selected
}
