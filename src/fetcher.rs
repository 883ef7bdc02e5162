// src/fetcher.rs
// Upstream NewsAPI client behind the `NewsSource` seam so the cache and HTTP
// layers stay testable with stub sources.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Deserialize;

use crate::article::RawArticle;
use crate::error::FetchError;

const NEWS_API_URL: &str = "https://newsapi.org/v2/everything";
const QUERY: &str = "bitcoin";

pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";

/// A provider of raw articles for a time window.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Articles matching the tracked query published within `[start, end]`,
    /// in no guaranteed order.
    async fn fetch(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawArticle>, FetchError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    articles: Vec<RawArticle>,
    code: Option<String>,
    message: Option<String>,
}

/// Production source backed by the NewsAPI `everything` endpoint.
///
/// Holds no state between calls beyond the reused HTTP client. A missing API
/// key is reported as `FetchError::MissingApiKey` on fetch, not at
/// construction, so the server still boots without a credential.
pub struct NewsApiFetcher {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl NewsApiFetcher {
    pub fn from_env() -> Self {
        let api_key = std::env::var(ENV_NEWS_API_KEY)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::new(api_key)
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::new(Some(api_key.into()))
    }

    fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl NewsSource for NewsApiFetcher {
    async fn fetch(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawArticle>, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingApiKey)?;

        let params = [
            ("q", QUERY.to_string()),
            ("from", start.format("%Y-%m-%d").to_string()),
            ("to", end.format("%Y-%m-%d").to_string()),
            ("language", "en".to_string()),
            ("sortBy", "publishedAt".to_string()),
            ("apiKey", api_key.to_string()),
        ];

        let body = self
            .client
            .get(NEWS_API_URL)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let articles = decode_response(&body)?;
        counter!("news_fetch_articles_total").increment(articles.len() as u64);
        Ok(articles)
    }

    fn name(&self) -> &'static str {
        "NewsAPI"
    }
}

/// Decode a NewsAPI body, mapping a reported non-ok status to a typed error.
fn decode_response(body: &str) -> Result<Vec<RawArticle>, FetchError> {
    let resp: NewsApiResponse = serde_json::from_str(body)?;
    if resp.status != "ok" {
        return Err(FetchError::ApiStatus {
            code: resp.code.unwrap_or_else(|| "unknown".to_string()),
            message: resp.message.unwrap_or_else(|| "unknown error".to_string()),
        });
    }
    Ok(resp.articles)
}
