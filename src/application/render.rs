//! Renders a [`PromptContext`] into the fixed prompt text.
//!
//! Missing values inside a price tuple render as `unknown`; missing values
//! inside a bracketed indicator list are left out of the list.

use crate::domain::entities::price_series::{known, PriceBar};
use crate::domain::entities::prompt_context::PromptContext;
use chrono::NaiveDate;
use std::fmt::Write;

const CLOSING_INSTRUCTIONS: &str = "
What are the bearish, neutral and bullish factors? Rate them in a scale (1 to 5 = important). Include the news headlines as appropriate. 
Conclude a short term investment strategy (max. 1 month) with buy signal, sell signal, rebuy signal and stop loss. 
If appropriate, that might be a shorting strategy as well. Estimate the success rate for a positive yield in a range from 1 to 10. 
";

const NO_NEWS: &str = "- No news available\n";

fn day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn price(value: Option<f64>) -> String {
    known(value)
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "unknown".into())
}

fn volume(value: Option<f64>) -> String {
    known(value)
        .map(|v| format!("{}", v.trunc() as i64))
        .unwrap_or_else(|| "unknown".into())
}

fn price_tuple(date: NaiveDate, bar: &PriceBar) -> String {
    format!(
        "{}: ({},{},{},{},{}); ",
        day(date),
        price(bar.open),
        price(bar.high),
        price(bar.low),
        price(bar.close),
        volume(bar.volume)
    )
}

/// `[(label: value),...]`, skipping absent values.
fn bracketed(values: impl IntoIterator<Item = (String, Option<f64>)>) -> String {
    let parts: Vec<String> = values
        .into_iter()
        .filter_map(|(label, value)| known(value).map(|v| format!("({label}: {v:.2})")))
        .collect();
    format!("[{}]", parts.join(","))
}

pub fn render_prompt(ctx: &PromptContext) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Today is: {}", day(ctx.as_of));
    let _ = writeln!(
        out,
        "The following description describes the stock `{}` including technical indicators, news, and general information:",
        ctx.symbol
    );

    out.push_str("The following basic information is available:\n");
    for (attribute, value) in ctx.basic_info.attributes() {
        let _ = writeln!(out, "- {}: {value}", attribute.replace('_', " "));
    }
    out.push_str("\n\n");

    out.push_str("The stock progression in date: (open, high, low, close, volume); ... format is:\n");
    for (date, bar) in &ctx.prices {
        out.push_str(&price_tuple(*date, bar));
    }

    out.push_str(
        "\n\nSome market indicators in format: `market indicator name: [(date: value), ...]` are given as follows: \n",
    );
    for (indicator, values) in &ctx.market_indicators {
        let list = bracketed(values.iter().map(|(date, value)| (day(*date), *value)));
        let _ = writeln!(out, "- {indicator}: {list}");
    }

    out.push_str(
        "\nSome stock related indicators in format: `date: [(stock indicator: value), ...]` are given as follows: \n",
    );
    for (date, row) in &ctx.stock_indicators {
        let _ = writeln!(out, "- {}: {}", day(*date), bracketed(row.iter().cloned()));
    }

    out.push_str("\n\n");
    out.push_str("The following news articles are available:\n");
    if ctx.news.is_empty() {
        out.push_str(NO_NEWS);
    }
    for item in &ctx.news {
        let _ = write!(
            out,
            "- {}: `{}`\n(Source: {})\n",
            day(item.published_on()),
            item.title,
            item.source
        );
    }

    out.push_str("\n\n");
    out.push_str(CLOSING_INSTRUCTIONS);
    out
}
