//! SEC EDGAR API client for company filings
//!
//! Rate limit: 10 requests per second (as per SEC fair access policy)
//! User-Agent requirement: Must include company name and contact email

use super::{SharedRateLimiter, decode_json, http_client};
use crate::config::EconomyConfig;
use crate::error::{EconomyError, Result};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;

const SEC_BASE_URL: &str = "https://data.sec.gov";
const SEC_COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

const REQUESTS_PER_SECOND: NonZeroU32 = match NonZeroU32::new(10) {
    Some(rate) => rate,
    None => NonZeroU32::MIN,
};

/// SEC filing type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilingType {
    /// Annual report
    #[serde(rename = "10-K")]
    Form10K,
    /// Quarterly report
    #[serde(rename = "10-Q")]
    Form10Q,
    /// Current report (material events)
    #[serde(rename = "8-K")]
    Form8K,
}

impl FilingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilingType::Form10K => "10-K",
            FilingType::Form10Q => "10-Q",
            FilingType::Form8K => "8-K",
        }
    }
}

/// SEC filing metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecFiling {
    pub accession_number: String,
    pub form_type: String,
    pub filing_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_date: Option<String>,
    pub primary_document: String,
    /// Link to the primary document
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct CompanySubmissions {
    filings: FilingsData,
}

#[derive(Debug, Deserialize)]
struct FilingsData {
    recent: RecentFilings,
}

/// Column-oriented filing history as EDGAR returns it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentFilings {
    accession_number: Vec<String>,
    filing_date: Vec<String>,
    #[serde(default)]
    report_date: Vec<Option<String>>,
    form: Vec<String>,
    primary_document: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TickerEntry {
    cik_str: serde_json::Value,
    ticker: String,
}

/// SEC EDGAR API client
pub struct SecEdgarClient {
    client: Client,
    user_agent: String,
    rate_limiter: SharedRateLimiter,
}

impl SecEdgarClient {
    /// Create a new SEC EDGAR client
    ///
    /// # Arguments
    /// * `user_agent` - Application name and contact email, e.g. `"MyApp (contact@example.com)"`
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            user_agent: user_agent.into(),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(REQUESTS_PER_SECOND))),
        }
    }

    pub fn from_config(config: &EconomyConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout, Some(&config.sec_user_agent))?,
            user_agent: config.sec_user_agent.clone(),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(REQUESTS_PER_SECOND))),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| EconomyError::ApiError(format!("SEC request failed: {e}")))?;

        decode_json(response, "SEC").await
    }

    /// Map of upper-case ticker to CIK for every listed company
    pub async fn company_tickers(&self) -> Result<HashMap<String, String>> {
        let data: HashMap<String, TickerEntry> = self.get(SEC_COMPANY_TICKERS_URL).await?;

        Ok(data
            .into_values()
            .filter_map(|entry| {
                let cik = match entry.cik_str {
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::String(s) => s,
                    _ => return None,
                };
                Some((entry.ticker.to_uppercase(), cik))
            })
            .collect())
    }

    /// Get CIK number from stock ticker
    pub async fn get_cik(&self, ticker: &str) -> Result<String> {
        self.company_tickers()
            .await?
            .remove(&ticker.to_uppercase())
            .ok_or_else(|| EconomyError::unavailable(ticker, "ticker not found in SEC company list"))
    }

    /// Most recent filings for a company, newest first
    pub async fn get_filings(
        &self,
        cik: &str,
        form_type: Option<FilingType>,
        limit: usize,
    ) -> Result<Vec<SecFiling>> {
        let url = format!("{SEC_BASE_URL}/submissions/CIK{}.json", pad_cik(cik));
        let submissions: CompanySubmissions = self.get(&url).await?;
        let recent = submissions.filings.recent;

        let filings = (0..recent.accession_number.len())
            .filter(|&i| form_type.is_none_or(|ft| recent.form.get(i).is_some_and(|f| f == ft.as_str())))
            .take(limit)
            .filter_map(|i| {
                let accession_number = recent.accession_number.get(i)?.clone();
                let primary_document = recent.primary_document.get(i)?.clone();
                Some(SecFiling {
                    url: self.get_filing_url(cik, &accession_number, &primary_document),
                    accession_number,
                    form_type: recent.form.get(i)?.clone(),
                    filing_date: recent.filing_date.get(i)?.clone(),
                    report_date: recent.report_date.get(i).cloned().flatten(),
                    primary_document,
                })
            })
            .collect();

        Ok(filings)
    }

    /// Build URL to access a filing document
    pub fn get_filing_url(&self, cik: &str, accession_number: &str, document: &str) -> String {
        let cik_trimmed = cik.trim_start_matches('0');
        let accession_clean = accession_number.replace('-', "");
        format!("https://www.sec.gov/Archives/edgar/data/{cik_trimmed}/{accession_clean}/{document}")
    }
}

fn pad_cik(cik: &str) -> String {
    format!("{:0>10}", cik.trim_start_matches('0'))
}
