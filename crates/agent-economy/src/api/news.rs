//! NewsAPI client
//!
//! Searches `/v2/everything`. The free tier allows 100 requests per day, so
//! callers keep page sizes small and queries few.

use super::{SharedRateLimiter, http_client, rate_limiter};
use crate::config::EconomyConfig;
use crate::error::{EconomyError, Result};
use crate::news::NewsArticle;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;

const NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2";

const DEFAULT_RATE: NonZeroU32 = match NonZeroU32::new(30) {
    Some(rate) => rate,
    None => NonZeroU32::MIN,
};

/// Search parameters for `/v2/everything`
#[derive(Debug, Clone, PartialEq)]
pub struct NewsQuery {
    pub query: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub sources: Vec<String>,
    pub language: Option<String>,
    pub sort_by: Option<String>,
    pub page_size: usize,
}

impl NewsQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            from: None,
            to: None,
            sources: Vec::new(),
            language: Some("en".to_string()),
            sort_by: Some("relevancy".to_string()),
            page_size: 20,
        }
    }

    /// Restrict to the last `days` days, ending today
    pub fn last_days(mut self, days: i64) -> Self {
        let today = Utc::now().date_naive();
        self.from = Some(today - ChronoDuration::days(days));
        self.to = Some(today);
        self
    }

    pub fn sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Ordering: `relevancy`, `popularity` or `publishedAt`
    pub fn sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.query.clone()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(from) = self.from {
            params.push(("from", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to {
            params.push(("to", to.format("%Y-%m-%d").to_string()));
        }
        if !self.sources.is_empty() {
            params.push(("sources", self.sources.join(",")));
        }
        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }
        if let Some(sort_by) = &self.sort_by {
            params.push(("sortBy", sort_by.clone()));
        }
        params
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    articles: Vec<RawArticle>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(default)]
    name: Option<String>,
}

impl From<RawArticle> for NewsArticle {
    fn from(raw: RawArticle) -> Self {
        Self {
            title: raw.title.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
            published_at: raw.published_at,
            source: raw.source.and_then(|s| s.name).unwrap_or_default(),
        }
    }
}

/// NewsAPI client
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl NewsApiClient {
    /// Create a new NewsAPI client
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            rate_limiter: rate_limiter(None, DEFAULT_RATE),
        }
    }

    /// Create from configuration; fails when no NewsAPI key is configured
    pub fn from_config(config: &EconomyConfig) -> Result<Self> {
        let api_key = config
            .news_api_key
            .clone()
            .ok_or(EconomyError::MissingCredential("NEWS_API_KEY"))?;

        Ok(Self {
            client: http_client(config.request_timeout, None)?,
            api_key,
            rate_limiter: rate_limiter(None, DEFAULT_RATE),
        })
    }

    /// Search all articles matching `query`
    ///
    /// An empty result set is returned as an empty list; callers decide
    /// whether that is an error for their section.
    pub async fn search(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>> {
        self.rate_limiter.until_ready().await;

        let url = format!("{NEWSAPI_BASE_URL}/everything");
        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(&query.to_params())
            .send()
            .await
            .map_err(|e| EconomyError::ApiError(format!("NewsAPI request failed: {e}")))?;

        let status = response.status();
        let data: EverythingResponse = response
            .json()
            .await
            .map_err(|e| EconomyError::ApiError(format!("Failed to parse NewsAPI response: {e}")))?;

        if !status.is_success() || data.status != "ok" {
            return Err(EconomyError::ApiError(format!(
                "NewsAPI error: {} {}",
                status,
                data.message.unwrap_or_default()
            )));
        }

        tracing::debug!(query = %query.query, articles = data.articles.len(), "NewsAPI search");
        Ok(data.articles.into_iter().map(NewsArticle::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params() {
        let query = NewsQuery::new("sanctions -sports")
            .sources(["reuters", "bbc-news"])
            .sort_by("publishedAt")
            .page_size(30);
        let params = query.to_params();

        assert!(params.contains(&("q", "sanctions -sports".to_string())));
        assert!(params.contains(&("sources", "reuters,bbc-news".to_string())));
        assert!(params.contains(&("sortBy", "publishedAt".to_string())));
        assert!(params.contains(&("pageSize", "30".to_string())));
        assert!(params.contains(&("language", "en".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "from"));
    }

    #[test]
    fn test_last_days_window() {
        let query = NewsQuery::new("oil").last_days(7);
        let (from, to) = (query.from.unwrap(), query.to.unwrap());
        assert_eq!((to - from).num_days(), 7);
    }

    #[test]
    fn test_article_mapping_tolerates_nulls() {
        let raw = r#"{"status":"ok","totalResults":1,"articles":[{"source":{"id":null,"name":"Reuters"},
            "title":"Oil climbs","description":null,"url":"https://example.com/a","publishedAt":"2024-05-01T10:00:00Z"}]}"#;
        let data: EverythingResponse = serde_json::from_str(raw).unwrap();
        let articles: Vec<NewsArticle> = data.articles.into_iter().map(NewsArticle::from).collect();

        assert_eq!(articles[0].title, "Oil climbs");
        assert_eq!(articles[0].description, "");
        assert_eq!(articles[0].source, "Reuters");
        assert_eq!(articles[0].published_at.as_deref(), Some("2024-05-01T10:00:00Z"));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = EconomyConfig::default();
        assert!(matches!(
            NewsApiClient::from_config(&config),
            Err(EconomyError::MissingCredential("NEWS_API_KEY"))
        ));
    }
}
