pub mod generate_prompt;
pub mod render;
pub mod update_market_indicators;
pub mod update_news;
pub mod update_prices;
pub mod update_stock_indicators;
