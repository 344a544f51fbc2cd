use super::{get_json, http_client, FeedError};
use crate::domain::entities::indicator_series::IndicatorSeries;
use crate::domain::error::DomainError;
use crate::domain::ports::macro_data::MacroIndicatorSource;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;

const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// Federal Reserve Economic Data observations.
pub struct FredFeed {
    api_key: String,
    client: reqwest::Client,
}

impl FredFeed {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: http_client(),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

/// `value` is `"."` when FRED has no data for the date.
#[derive(Debug, serde::Deserialize)]
struct Observation {
    date: String,
    value: String,
}

fn parse_observations(response: ObservationsResponse) -> Result<IndicatorSeries, FeedError> {
    let mut series = IndicatorSeries::new();
    for obs in response.observations {
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
            .map_err(|e| FeedError::Parse(format!("Invalid date '{}': {e}", obs.date)))?;
        series.insert(date, obs.value.trim().parse::<f64>().ok());
    }
    Ok(series)
}

#[async_trait]
impl MacroIndicatorSource for FredFeed {
    async fn series(
        &self,
        indicator_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<IndicatorSeries, DomainError> {
        if self.api_key.is_empty() {
            return Err(FeedError::Config("FRED API key is empty".into()).into());
        }
        info!(indicator = indicator_id, "Fetching indicator from FRED API");

        let mut params = vec![
            ("series_id", indicator_id.to_string()),
            ("api_key", self.api_key.clone()),
            ("file_type", "json".to_string()),
        ];
        if let Some(from) = from {
            params.push(("observation_start", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = to {
            params.push(("observation_end", to.format("%Y-%m-%d").to_string()));
        }

        let request = self
            .client
            .get(format!("{FRED_BASE_URL}/series/observations"))
            .query(&params);
        let response: ObservationsResponse = get_json(request, "FRED").await?;
        Ok(parse_observations(response)?)
    }
}
