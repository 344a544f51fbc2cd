use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub url: String,
    pub summary: Option<String>,
}

impl NewsItem {
    pub fn published_on(&self) -> NaiveDate {
        self.published_at.date_naive()
    }
}

/// Upserts `newer` into `existing` keyed by URL (newer wins), then orders the
/// result by publication time ascending. Ties keep their relative order.
pub fn merge_by_url(existing: Vec<NewsItem>, newer: &[NewsItem]) -> Vec<NewsItem> {
    let mut merged = existing;
    for item in newer {
        match merged.iter_mut().find(|old| old.url == item.url) {
            Some(old) => *old = item.clone(),
            None => merged.push(item.clone()),
        }
    }
    merged.sort_by_key(|item| item.published_at);
    merged
}
