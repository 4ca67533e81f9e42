//! Report page fetching and text extraction
//!
//! Release links published by FRED sources mostly point at HTML pages.
//! The parser strips markup down to readable text and keeps a short excerpt
//! for the prompt. Every failure is folded into the returned text.

use super::http_client;
use crate::error::{EconomyError, Result};
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use url::Url;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

/// Default excerpt length for report content
pub const DEFAULT_EXCERPT_CHARS: usize = 500;

/// A hyperlink found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub url: String,
    pub text: String,
}

/// Fetches report pages and converts them to plain text
pub struct ReportParser {
    client: Client,
    script_style: Regex,
    tag: Regex,
    anchor: Regex,
}

impl ReportParser {
    pub fn new(timeout: Duration) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| EconomyError::ConfigError(format!("Invalid pattern: {e}")))
        };

        Ok(Self {
            client: http_client(timeout, Some(BROWSER_USER_AGENT))?,
            script_style: compile(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>")?,
            tag: compile(r"(?s)<[^>]*>")?,
            anchor: compile(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a\s*>"#)?,
        })
    }

    /// Excerpt of the report at `url`, at most `max_chars` plus `"..."`
    ///
    /// Never fails: a missing URL, PDF link or fetch error is described in the
    /// returned text.
    pub async fn get_report_content(&self, url: &str, max_chars: usize) -> String {
        if url.trim().is_empty() {
            return "No URL provided".to_string();
        }

        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => return format!("Error retrieving content: invalid URL {url}: {e}"),
        };

        if is_pdf(&parsed) {
            tracing::debug!(url, "skipping PDF report");
            return "PDF report content is not supported; see the report link.".to_string();
        }

        match self.fetch_html(parsed).await {
            Ok(html) => excerpt(&self.html_to_text(&html), max_chars),
            Err(e) => {
                tracing::warn!(url, error = %e, "failed to fetch report");
                format!("Error parsing HTML: {e}")
            }
        }
    }

    /// Links on the page at `url`, resolved against it
    pub async fn extract_links(&self, url: &str, pdf_only: bool) -> Result<Vec<PageLink>> {
        let base = Url::parse(url).map_err(|e| EconomyError::ApiError(format!("Invalid URL {url}: {e}")))?;
        let html = self.fetch_html(base.clone()).await?;
        Ok(self.links_in(&html, &base, pdf_only))
    }

    async fn fetch_html(&self, url: Url) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EconomyError::ApiError(format!("report request returned {status}")));
        }
        Ok(response.text().await?)
    }

    /// Visible text of an HTML document, one chunk per line
    pub fn html_to_text(&self, html: &str) -> String {
        let without_code = self.script_style.replace_all(html, " ");
        let text = self.tag.replace_all(&without_code, "\n");
        let text = decode_entities(&text);

        text.lines()
            .flat_map(|line| line.trim().split("  "))
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn links_in(&self, html: &str, base: &Url, pdf_only: bool) -> Vec<PageLink> {
        self.anchor
            .captures_iter(html)
            .filter_map(|cap| {
                let url = base.join(cap.get(1)?.as_str()).ok()?;
                if pdf_only && !is_pdf(&url) {
                    return None;
                }
                let text = self.tag.replace_all(cap.get(2)?.as_str(), "");
                Some(PageLink {
                    url: url.to_string(),
                    text: decode_entities(text.trim()),
                })
            })
            .collect()
    }
}

fn is_pdf(url: &Url) -> bool {
    url.path().to_lowercase().ends_with(".pdf")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// First `max_chars` characters, with `"..."` appended when cut
pub fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
