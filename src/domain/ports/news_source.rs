use crate::domain::entities::news_item::NewsItem;
use crate::domain::error::DomainError;
use async_trait::async_trait;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// One page of the latest articles about `symbol`. `page` starts at 1.
    async fn latest(
        &self,
        symbol: &str,
        page_size: u32,
        page: u32,
    ) -> Result<Vec<NewsItem>, DomainError>;
}
