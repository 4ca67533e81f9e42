//! Federal Reserve Economic Data (FRED) API client
//!
//! FRED is a database maintained by the Federal Reserve Bank of St. Louis
//! containing over 800,000 economic time series from numerous sources.
//!
//! API Key: Free registration at https://fred.stlouisfed.org/docs/api/api_key.html
//! Rate Limit: 120 requests per minute

use super::{SharedRateLimiter, decode_json, http_client, rate_limiter};
use crate::config::EconomyConfig;
use crate::error::{EconomyError, Result};
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";

const DEFAULT_RATE: NonZeroU32 = match NonZeroU32::new(120) {
    Some(rate) => rate,
    None => NonZeroU32::MIN,
};

/// FRED series used by the macro analyst
pub mod indicators {
    /// Series id and title for every indicator the analyst knows about
    pub const CATALOGUE: [(&str, &str); 15] = [
        ("GDP", "Gross Domestic Product"),
        ("GDPC1", "Real Gross Domestic Product"),
        ("UNRATE", "Unemployment Rate"),
        ("CPIAUCSL", "Consumer Price Index for All Urban Consumers"),
        ("FEDFUNDS", "Federal Funds Effective Rate"),
        ("T10Y2Y", "10-Year Treasury Minus 2-Year Treasury"),
        ("PAYEMS", "Total Nonfarm Payrolls"),
        ("INDPRO", "Industrial Production Index"),
        ("HOUST", "Housing Starts"),
        ("RSAFS", "Retail Sales"),
        ("PCE", "Personal Consumption Expenditures"),
        ("DCOILWTICO", "Crude Oil Prices: WTI"),
        ("USREC", "US Recession Indicator"),
        ("UMCSENT", "University of Michigan Consumer Sentiment"),
        ("BUSINV", "Total Business Inventories"),
    ];

    /// Indicators summarized in every macro analysis
    pub const KEY_INDICATORS: [&str; 10] = [
        "GDP", "GDPC1", "UNRATE", "CPIAUCSL", "FEDFUNDS", "T10Y2Y", "PAYEMS", "INDPRO", "HOUST",
        "UMCSENT",
    ];

    pub const YIELD_SPREAD: &str = "T10Y2Y";
    pub const UNEMPLOYMENT: &str = "UNRATE";
    pub const INDUSTRIAL_PRODUCTION: &str = "INDPRO";
    pub const RECESSION: &str = "USREC";

    /// Human-readable title for a series id
    pub fn title(series_id: &str) -> Option<&'static str> {
        CATALOGUE
            .iter()
            .find(|(id, _)| *id == series_id)
            .map(|(_, title)| *title)
    }
}

/// FRED release sources
pub mod sources {
    /// Board of Governors of the Federal Reserve System
    pub const FED: u32 = 1;
    /// Bureau of Economic Analysis
    pub const BEA: u32 = 18;
    /// Census Bureau
    pub const CENSUS: u32 = 19;
    /// Bureau of Labor Statistics
    pub const BLS: u32 = 22;
    /// Energy Information Administration
    pub const EIA: u32 = 53;
    /// National Bureau of Economic Research
    pub const NBER: u32 = 55;
    /// International Monetary Fund
    pub const IMF: u32 = 60;
    pub const EUROSTAT: u32 = 61;

    /// Sources polled for recent releases
    pub const DEFAULT_RELEASE_SOURCES: [&str; 3] = ["fed", "bea", "bls"];

    /// Resolve a short source name
    pub fn lookup(name: &str) -> Option<u32> {
        match name.to_lowercase().as_str() {
            "fed" => Some(FED),
            "bea" => Some(BEA),
            "census" => Some(CENSUS),
            "bls" => Some(BLS),
            "eia" => Some(EIA),
            "nber" => Some(NBER),
            "imf" => Some(IMF),
            "eurostat" => Some(EUROSTAT),
            _ => None,
        }
    }
}

/// Observation data from FRED series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Date of observation (YYYY-MM-DD)
    pub date: String,
    /// Value (can be "." for missing data)
    pub value: String,
}

/// Parsed observation, oldest first when part of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    fn parse(obs: &Observation) -> Option<Self> {
        let value = obs.value.trim().parse::<f64>().ok()?;
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").ok()?;
        Some(Self { date, value })
    }
}

/// A statistical release published by a FRED source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub press_release: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime_start: Option<String>,
}

/// Releases grouped under the source that published them
#[derive(Debug, Clone, Serialize)]
pub struct SourceReleases {
    pub source: String,
    pub releases: Vec<Release>,
}

/// A publication date of a release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseDate {
    pub release_id: u32,
    pub date: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct ReleasesResponse {
    #[serde(default)]
    releases: Vec<Release>,
}

#[derive(Debug, Deserialize)]
struct ReleaseDatesResponse {
    #[serde(default)]
    release_dates: Vec<ReleaseDate>,
}

/// FRED API client
pub struct FredClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl FredClient {
    /// Create a new FRED client
    ///
    /// # Arguments
    /// * `api_key` - FRED API key
    /// * `rate_limit` - Requests per minute (default 120)
    pub fn new(api_key: impl Into<String>, rate_limit: Option<u32>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            rate_limiter: rate_limiter(rate_limit, DEFAULT_RATE),
        }
    }

    /// Create from configuration; fails when no FRED key is configured
    pub fn from_config(config: &EconomyConfig) -> Result<Self> {
        let api_key = config
            .fred_api_key
            .clone()
            .ok_or(EconomyError::MissingCredential("FRED_API_KEY"))?;

        Ok(Self {
            client: http_client(config.request_timeout, None)?,
            api_key,
            rate_limiter: rate_limiter(None, DEFAULT_RATE),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{FRED_BASE_URL}/{path}");
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("file_type", "json")])
            .query(params)
            .send()
            .await
            .map_err(|e| EconomyError::ApiError(format!("FRED request failed: {e}")))?;

        decode_json(response, "FRED").await
    }

    /// Get raw observations for a series
    pub async fn get_observations(
        &self,
        series_id: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Observation>> {
        let mut params = vec![("series_id", series_id.to_string())];
        if let Some(start) = start_date {
            params.push(("observation_start", start.to_string()));
        }
        if let Some(end) = end_date {
            params.push(("observation_end", end.to_string()));
        }
        if let Some(lim) = limit {
            params.push(("limit", lim.to_string()));
        }

        let data: ObservationsResponse = self.get("series/observations", &params).await?;
        Ok(data.observations)
    }

    /// Get the numeric series over the last `lookback_days`, oldest first
    ///
    /// Missing values (".") are skipped. An empty window is an error.
    pub async fn get_series(&self, series_id: &str, lookback_days: i64) -> Result<Vec<SeriesPoint>> {
        let end = Utc::now().date_naive();
        let start = end - ChronoDuration::days(lookback_days);
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();

        let observations = self
            .get_observations(series_id, Some(&start), Some(&end), None)
            .await?;

        let mut points: Vec<SeriesPoint> = observations.iter().filter_map(SeriesPoint::parse).collect();
        points.sort_by_key(|p| p.date);

        match points.last() {
            Some(latest) => {
                tracing::debug!(series_id, points = points.len(), latest = %latest.date, "FRED series retrieved");
                Ok(points)
            }
            None => Err(EconomyError::unavailable(
                series_id,
                format!("no observations between {start} and {end}"),
            )),
        }
    }

    /// Releases published by a source, newest release ids first
    pub async fn get_source_releases(&self, source_id: u32, limit: usize) -> Result<Vec<Release>> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let params = [
            ("source_id", source_id.to_string()),
            ("realtime_start", today.clone()),
            ("realtime_end", today),
            ("limit", limit.to_string()),
            ("order_by", "release_id".to_string()),
            ("sort_order", "desc".to_string()),
        ];

        let data: ReleasesResponse = self.get("source/releases", &params).await?;
        Ok(data.releases)
    }

    /// Recent releases for each named source
    ///
    /// Unknown names and failing sources are skipped with a warning.
    pub async fn get_recent_releases(
        &self,
        source_names: &[&str],
        limit_per_source: usize,
    ) -> Result<Vec<SourceReleases>> {
        let mut results = Vec::new();

        for name in source_names {
            let Some(source_id) = sources::lookup(name) else {
                tracing::warn!(source = name, "Unknown FRED source");
                continue;
            };

            match self.get_source_releases(source_id, limit_per_source).await {
                Ok(releases) if !releases.is_empty() => results.push(SourceReleases {
                    source: (*name).to_string(),
                    releases,
                }),
                Ok(_) => tracing::debug!(source = name, "No releases from FRED source"),
                Err(e) => tracing::warn!("Failed to get releases for {} from FRED: {}", name, e),
            }
        }

        if results.is_empty() {
            return Err(EconomyError::unavailable(
                "FRED releases",
                "no source returned any release",
            ));
        }

        Ok(results)
    }

    /// Publication dates of a release, newest first
    pub async fn get_release_dates(&self, release_id: u32, limit: usize) -> Result<Vec<ReleaseDate>> {
        let params = [
            ("release_id", release_id.to_string()),
            ("limit", limit.to_string()),
            ("sort_order", "desc".to_string()),
        ];

        let data: ReleaseDatesResponse = self.get("release/dates", &params).await?;
        Ok(data.release_dates)
    }
}
