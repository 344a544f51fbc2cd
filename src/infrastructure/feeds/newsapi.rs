use super::{get_json, http_client, FeedError};
use crate::domain::entities::news_item::NewsItem;
use crate::domain::error::DomainError;
use crate::domain::ports::news_source::NewsSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

const NEWSAPI_URL: &str = "https://newsapi.org/v2/everything";

/// NewsAPI `everything` search, newest first.
pub struct NewsApiFeed {
    api_key: String,
    client: reqwest::Client,
}

impl NewsApiFeed {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: http_client(),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    source: ArticleSource,
    #[serde(default)]
    title: Option<String>,
    url: String,
    published_at: DateTime<Utc>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ArticleSource {
    #[serde(default)]
    name: Option<String>,
}

fn query_for(symbol: &str) -> String {
    format!("({symbol} stock)")
}

fn into_items(response: EverythingResponse) -> Vec<NewsItem> {
    response
        .articles
        .into_iter()
        .map(|a| NewsItem {
            title: a.title.unwrap_or_default(),
            source: a.source.name.unwrap_or_default(),
            published_at: a.published_at,
            url: a.url,
            summary: a
                .content
                .filter(|c| !c.is_empty())
                .or(a.description.filter(|d| !d.is_empty())),
        })
        .collect()
}

#[async_trait]
impl NewsSource for NewsApiFeed {
    async fn latest(
        &self,
        symbol: &str,
        page_size: u32,
        page: u32,
    ) -> Result<Vec<NewsItem>, DomainError> {
        if self.api_key.is_empty() {
            return Err(FeedError::Config("News API key is empty".into()).into());
        }
        info!(symbol, page_size, page, "Collecting news");

        let request = self.client.get(NEWSAPI_URL).query(&[
            ("q", query_for(symbol)),
            ("sortBy", "publishedAt".to_string()),
            ("apiKey", self.api_key.clone()),
            ("language", "en".to_string()),
            ("pageSize", page_size.to_string()),
            ("page", page.to_string()),
        ]);
        let response: EverythingResponse = get_json(request, "News").await?;
        Ok(into_items(response))
    }
}
