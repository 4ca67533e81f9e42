//! Federal Register document search
//!
//! Public API, no key required.

use super::{decode_json, http_client};
use crate::config::EconomyConfig;
use crate::error::{EconomyError, Result};
use crate::news::NewsArticle;
use reqwest::Client;
use serde::Deserialize;

const FEDERAL_REGISTER_URL: &str = "https://www.federalregister.gov/api/v1/documents.json";

#[derive(Debug, Deserialize)]
struct DocumentsResponse {
    #[serde(default)]
    results: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct Document {
    title: String,
    #[serde(default)]
    r#abstract: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    publication_date: Option<String>,
}

impl From<Document> for NewsArticle {
    fn from(doc: Document) -> Self {
        Self {
            title: doc.title,
            description: doc.r#abstract.unwrap_or_default(),
            url: doc.html_url.unwrap_or_default(),
            published_at: doc.publication_date,
            source: "Federal Register".to_string(),
        }
    }
}

/// Term expression for `conditions[term]`: every `" OR "` becomes `+`
pub fn search_term(query: &str) -> String {
    query.replace(" OR ", "+")
}

/// Federal Register client
pub struct FederalRegisterClient {
    client: Client,
}

impl FederalRegisterClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn from_config(config: &EconomyConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.request_timeout, None)?,
        })
    }

    /// Most relevant documents for `query`
    pub async fn documents(&self, query: &str, per_page: usize) -> Result<Vec<NewsArticle>> {
        let response = self
            .client
            .get(FEDERAL_REGISTER_URL)
            .query(&[
                ("conditions[term]", search_term(query)),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| EconomyError::ApiError(format!("Federal Register request failed: {e}")))?;

        let data: DocumentsResponse = decode_json(response, "Federal Register").await?;
        Ok(data.results.into_iter().map(NewsArticle::from).collect())
    }
}

impl Default for FederalRegisterClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_term_joins_alternatives() {
        assert_eq!(
            search_term("economic policy OR trade policy OR sanctions"),
            "economic policy+trade policy+sanctions"
        );
        assert_eq!(search_term("tariffs"), "tariffs");
    }

    #[test]
    fn test_document_mapping() {
        let raw = r#"{"count":1,"results":[{"title":"Import Restrictions","abstract":"New duties on steel.",
            "html_url":"https://www.federalregister.gov/d/1","publication_date":"2024-05-02"}]}"#;
        let data: DocumentsResponse = serde_json::from_str(raw).unwrap();
        let docs: Vec<NewsArticle> = data.results.into_iter().map(NewsArticle::from).collect();

        assert_eq!(docs[0].title, "Import Restrictions");
        assert_eq!(docs[0].description, "New duties on steel.");
        assert_eq!(docs[0].url, "https://www.federalregister.gov/d/1");
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_documents() {
        let client = FederalRegisterClient::new();
        let docs = client.documents("trade regulations OR fiscal policy", 5).await.unwrap();
        assert!(docs.len() <= 5);
    }
}
