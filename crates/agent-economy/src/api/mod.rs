//! API clients for economic and market data providers

pub mod federal_register;
pub mod finnhub;
pub mod fred;
pub mod news;
pub mod report;
pub mod sec_edgar;
pub mod yahoo;

pub use federal_register::FederalRegisterClient;
pub use finnhub::{EarningsEvent, FinnhubClient};
pub use fred::{
    FredClient, Observation, Release, ReleaseDate, SeriesPoint, SourceReleases, indicators, sources,
};
pub use news::{NewsApiClient, NewsQuery};
pub use report::ReportParser;
pub use sec_edgar::{FilingType, SecEdgarClient, SecFiling};
pub use yahoo::{MarketDataClient, PriceBar};

use crate::error::{EconomyError, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

pub(crate) type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Build a per-minute rate limiter, falling back to `default` for a zero rate
pub(crate) fn rate_limiter(per_minute: Option<u32>, default: NonZeroU32) -> SharedRateLimiter {
    let rate = per_minute.and_then(NonZeroU32::new).unwrap_or(default);
    Arc::new(RateLimiter::direct(Quota::per_minute(rate)))
}

/// HTTP client with a request timeout
pub(crate) fn http_client(timeout: Duration, user_agent: Option<&str>) -> Result<Client> {
    let mut builder = Client::builder().timeout(timeout);
    if let Some(agent) = user_agent {
        builder = builder.user_agent(agent);
    }
    builder
        .build()
        .map_err(|e| EconomyError::ConfigError(format!("Failed to build HTTP client: {e}")))
}

/// Check the status and decode a JSON body, naming `source` in errors
pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response, source: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = body.chars().take(200).collect::<String>();
        return Err(EconomyError::ApiError(format!(
            "{source} API error: {status} {detail}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| EconomyError::ApiError(format!("Failed to parse {source} response: {e}")))
}
