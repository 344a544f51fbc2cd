use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "stockgpt",
    about = "Collect market data and build LLM prompts for stock analysis"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stock price data
    Symbols {
        #[command(subcommand)]
        action: SymbolsAction,
    },
    /// Macroeconomic indicators (FRED)
    MarketIndicators {
        #[command(subcommand)]
        action: MarketIndicatorsAction,
    },
    /// Technical indicators computed from stored prices
    StockIndicators {
        #[command(subcommand)]
        action: StockIndicatorsAction,
    },
    /// News articles
    News {
        #[command(subcommand)]
        action: NewsAction,
    },
    /// Prompt generation
    Query {
        #[command(subcommand)]
        action: QueryAction,
    },
}

#[derive(Subcommand)]
pub enum SymbolsAction {
    /// Fetch and store daily prices
    Collect {
        /// Symbols to collect (default: every stored symbol)
        #[arg(long = "symbol")]
        symbols: Vec<String>,
        #[command(flatten)]
        range: DateRange,
    },
}

#[derive(Subcommand)]
pub enum MarketIndicatorsAction {
    /// Fetch and store indicator observations
    Update {
        /// Indicator ids (default: the configured defaults)
        #[arg(long = "indicator")]
        indicators: Vec<String>,
        #[command(flatten)]
        range: DateRange,
    },
}

#[derive(Subcommand)]
pub enum StockIndicatorsAction {
    /// Recompute the default indicators for every stored symbol
    Update,
}

#[derive(Subcommand)]
pub enum NewsAction {
    /// Fetch and store the latest articles
    Update {
        /// Symbols to update (default: every stored symbol)
        #[arg(long = "symbol")]
        symbols: Vec<String>,
        #[arg(long, default_value = "15")]
        page_size: u32,
    },
}

#[derive(Subcommand)]
pub enum QueryAction {
    /// Print the prompt for one symbol
    Generate {
        #[arg(long)]
        symbol: String,
        /// Target date (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = parse_day)]
        day: Option<NaiveDate>,
        /// Refresh prices, news and indicators before generating
        #[arg(long)]
        update_symbol: bool,
        #[arg(long, default_value = "3")]
        market_indicators_max_value_count: usize,
        /// Days of stock indicators to include
        #[arg(long, default_value = "3")]
        stock_indicators_max_age: u32,
        /// Days of daily prices to include before sampling kicks in
        #[arg(long, default_value = "31")]
        stock_values_max_age: u32,
        #[arg(long, default_value = "7")]
        max_news_age: u32,
        #[arg(long, default_value = "7")]
        max_news_count: usize,
        /// Seed for the headline shuffle, for reproducible prompts
        #[arg(long)]
        news_seed: Option<u64>,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct DateRange {
    /// Start date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    pub start: Option<NaiveDate>,
    /// End date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    pub end: Option<NaiveDate>,
}

pub fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format: {s}. Use YYYY-MM-DD"))
}
