use clap::Parser;
use stockgpt::application::generate_prompt::PromptOptions;
use stockgpt::cli::commands::{
    Cli, Commands, MarketIndicatorsAction, NewsAction, QueryAction, StockIndicatorsAction,
    SymbolsAction,
};
use stockgpt::config::AppConfig;
use stockgpt::{logging, today, StockGpt};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing();

    // A future target date is a usage error, rejected before touching config or data.
    if let Commands::Query {
        action: QueryAction::Generate { day: Some(day), .. },
    } = &cli.command
    {
        if *day > today() {
            error!("Date {day} lies in the future");
            std::process::exit(1);
        }
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let app = match StockGpt::new(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Error initializing stockgpt: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(app, cli.command).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run_command(app: StockGpt, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Symbols {
            action: SymbolsAction::Collect { symbols, range },
        } => {
            let collected = app.collect_symbols(&symbols, range.start, range.end).await?;
            info!(symbols = ?collected, "Stock data collected");
        }
        Commands::MarketIndicators {
            action: MarketIndicatorsAction::Update { indicators, range },
        } => {
            let stored = app
                .update_market_indicators(&indicators, range.start, range.end)
                .await?;
            info!(indicators = ?stored, "Market indicators updated");
        }
        Commands::StockIndicators {
            action: StockIndicatorsAction::Update,
        } => {
            let updated = app.update_stock_indicators()?;
            info!(symbols = ?updated, "Stock indicators updated");
        }
        Commands::News {
            action: NewsAction::Update { symbols, page_size },
        } => {
            let updated = app.update_news(&symbols, page_size).await?;
            info!(symbols = ?updated, "News updated");
        }
        Commands::Query {
            action:
                QueryAction::Generate {
                    symbol,
                    day,
                    update_symbol,
                    market_indicators_max_value_count,
                    stock_indicators_max_age,
                    stock_values_max_age,
                    max_news_age,
                    max_news_count,
                    news_seed,
                },
        } => {
            let options = PromptOptions {
                as_of: day,
                market_indicators_max_value_count,
                stock_indicators_max_age,
                stock_values_max_age,
                max_news_age,
                max_news_count,
                refresh: update_symbol,
                news_seed,
            };
            let prompt = app.generate_prompt(&symbol, &options).await?;
            println!("{prompt}");
        }
    }
    Ok(())
}
