pub mod fred;
pub mod newsapi;
pub mod yahoo;

use crate::domain::error::DomainError;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/120.0.0.0 Safari/537.36";

/// Shared HTTP client. Yahoo rejects requests without a browser user agent.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default()
}

#[derive(Debug)]
pub enum FeedError {
    /// HTTP or network error
    Network(String),
    /// Response parsing error
    Parse(String),
    /// Configuration error (missing API key, etc.)
    Config(String),
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::Network(msg) => write!(f, "Network error: {msg}"),
            FeedError::Parse(msg) => write!(f, "Parse error: {msg}"),
            FeedError::Config(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for FeedError {}

impl From<FeedError> for DomainError {
    fn from(e: FeedError) -> Self {
        match e {
            FeedError::Config(msg) => DomainError::Config(msg),
            other => DomainError::Upstream(other.to_string()),
        }
    }
}

/// Sends a GET request and decodes the JSON body, failing on non-success status.
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
    provider: &str,
) -> Result<T, FeedError> {
    let resp = request
        .send()
        .await
        .map_err(|e| FeedError::Network(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FeedError::Network(format!(
            "{provider} API returned {status}: {body}"
        )));
    }

    resp.json()
        .await
        .map_err(|e| FeedError::Parse(e.to_string()))
}
