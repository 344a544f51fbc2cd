pub mod basic_info;
pub mod indicator_series;
pub mod indicator_table;
pub mod news_item;
pub mod price_series;
pub mod prompt_context;
