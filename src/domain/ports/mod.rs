pub mod macro_data;
pub mod market_data;
pub mod news_source;
pub mod repository;

use std::sync::Arc;

/// The upstream providers the update workflows and the renderer talk to.
#[derive(Clone)]
pub struct Sources {
    pub market_data: Arc<dyn market_data::MarketDataSource>,
    pub basic_info: Arc<dyn market_data::BasicInfoSource>,
    pub macro_data: Arc<dyn macro_data::MacroIndicatorSource>,
    pub news: Arc<dyn news_source::NewsSource>,
}
