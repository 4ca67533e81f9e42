//! Yahoo Finance price history client
//!
//! Used for index levels, sector and bond ETFs, Treasury yield indices and
//! commodity futures.

use crate::error::{EconomyError, Result};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// One daily bar of price history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Yahoo Finance client for daily price history
pub struct MarketDataClient {
    connector: yahoo::YahooConnector,
}

impl MarketDataClient {
    /// Create a new client
    pub fn new() -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| EconomyError::YahooFinanceError(e.to_string()))?;
        Ok(Self { connector })
    }

    /// Daily bars for the last `lookback_days`, oldest first
    ///
    /// An empty history is an error so callers can report it inline.
    pub async fn history(&self, symbol: &str, lookback_days: i64) -> Result<Vec<PriceBar>> {
        let end = Utc::now();
        let start = end - ChronoDuration::days(lookback_days);

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp()).map_err(|e| {
            EconomyError::YahooFinanceError(format!("Invalid start timestamp: {e}"))
        })?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| EconomyError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = self
            .connector
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| EconomyError::YahooFinanceError(format!("{symbol}: {e}")))?;

        let quotes = response
            .quotes()
            .map_err(|e| EconomyError::YahooFinanceError(format!("{symbol}: {e}")))?;

        let mut bars: Vec<PriceBar> = quotes
            .iter()
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(PriceBar {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                })
            })
            .collect();
        bars.sort_by_key(|bar| bar.date);

        if bars.is_empty() {
            return Err(EconomyError::unavailable(
                symbol,
                format!("empty price history over {lookback_days} days"),
            ));
        }

        tracing::debug!(symbol, bars = bars.len(), "price history retrieved");
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_history() {
        let client = MarketDataClient::new().unwrap();
        let bars = client.history("^GSPC", 30).await.unwrap();
        assert!(!bars.is_empty());
        assert!(bars.iter().all(|bar| bar.close > 0.0));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_unknown_symbol_is_error() {
        let client = MarketDataClient::new().unwrap();
        assert!(client.history("NOT-A-REAL-TICKER-XYZ", 30).await.is_err());
    }
}
