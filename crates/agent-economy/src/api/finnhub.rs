//! Finnhub client for the earnings calendar

use super::{SharedRateLimiter, decode_json, http_client, rate_limiter};
use crate::config::EconomyConfig;
use crate::error::{EconomyError, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

const FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";

const DEFAULT_RATE: NonZeroU32 = match NonZeroU32::new(60) {
    Some(rate) => rate,
    None => NonZeroU32::MIN,
};

/// A scheduled (or reported) earnings release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsEvent {
    pub symbol: String,
    /// Release date (YYYY-MM-DD)
    pub date: String,
    /// `bmo` (before open), `amc` (after close) or empty
    #[serde(default)]
    pub hour: String,
    #[serde(default)]
    pub eps_estimate: Option<f64>,
    #[serde(default)]
    pub revenue_estimate: Option<f64>,
    #[serde(default)]
    pub quarter: Option<u32>,
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EarningsCalendarResponse {
    #[serde(default)]
    earnings_calendar: Vec<EarningsEvent>,
}

/// Finnhub client with rate limiting
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl FinnhubClient {
    /// Create a new Finnhub client
    ///
    /// # Arguments
    /// * `api_key` - Finnhub API key
    /// * `rate_limit` - Requests per minute (free tier: 60)
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            rate_limiter: rate_limiter(Some(rate_limit), DEFAULT_RATE),
        }
    }

    pub fn from_config(config: &EconomyConfig) -> Result<Self> {
        let api_key = config
            .finnhub_api_key
            .clone()
            .ok_or(EconomyError::MissingCredential("FINNHUB_API_KEY"))?;

        Ok(Self {
            client: http_client(config.request_timeout, None)?,
            api_key,
            rate_limiter: rate_limiter(None, DEFAULT_RATE),
        })
    }

    /// Earnings releases between `from` and `to` inclusive
    ///
    /// # Arguments
    /// * `symbol` - Restrict to one symbol; `None` returns the whole calendar
    pub async fn earnings_calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        symbol: Option<&str>,
    ) -> Result<Vec<EarningsEvent>> {
        self.rate_limiter.until_ready().await;

        let mut params = vec![
            ("from", from.format("%Y-%m-%d").to_string()),
            ("to", to.format("%Y-%m-%d").to_string()),
            ("token", self.api_key.clone()),
        ];
        if let Some(symbol) = symbol {
            params.push(("symbol", symbol.to_string()));
        }

        let url = format!("{FINNHUB_BASE_URL}/calendar/earnings");
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| EconomyError::ApiError(format!("Finnhub request failed: {e}")))?;

        let data: EarningsCalendarResponse = decode_json(response, "Finnhub").await?;
        Ok(data.earnings_calendar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finnhub_client_creation() {
        let client = FinnhubClient::new("test_key", 60);
        assert_eq!(client.api_key, "test_key");
    }

    #[test]
    fn test_calendar_deserialization() {
        let raw = r#"{"earningsCalendar":[{"date":"2024-05-02","epsActual":null,"epsEstimate":1.5,
            "hour":"amc","quarter":2,"revenueActual":null,"revenueEstimate":90000000000,"symbol":"AAPL","year":2024}]}"#;
        let data: EarningsCalendarResponse = serde_json::from_str(raw).unwrap();
        let event = &data.earnings_calendar[0];
        assert_eq!(event.symbol, "AAPL");
        assert_eq!(event.hour, "amc");
        assert_eq!(event.eps_estimate, Some(1.5));
        assert_eq!(event.quarter, Some(2));
    }
}
