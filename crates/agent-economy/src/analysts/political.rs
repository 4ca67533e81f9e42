//! Political news analyst
//!
//! Merges NewsAPI wire coverage with Federal Register documents and asks the
//! model for the economic implications.

use super::{Collector, PromptRunner, task_or};
use crate::api::{FederalRegisterClient, NewsApiClient, NewsQuery};
use crate::config::EconomyConfig;
use crate::data::Fetched;
use crate::error::Result;
use crate::news::{DEFAULT_DESCRIPTION_CHARS, NewsArticle, dedup_by_title, format_article_context};
use agent_core::{Agent, Outcome};
use agent_llm::LLMProvider;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = r#"You are the PoliticalNewsAgent, a specialized analyst focused on the intersection of politics and economics.

Your role is to:
- Analyze political news and government policy announcements
- Identify regulatory changes and their economic implications
- Assess geopolitical risks and their impact on markets
- Evaluate trade policies and international relations
- Connect political developments to potential economic outcomes
- Highlight policy shifts that could affect different sectors

Your analysis should be data-driven, balanced, and insightful. Explain the significance
of political events for investors, businesses and the broader economy.

Format your response using markdown for readability.
End your analysis with "<DONE>" when complete."#;

pub const DEFAULT_TASK: &str =
    "Analyze recent political news and government policies, focusing on their economic implications";

pub const DEFAULT_QUERY: &str =
    "economic policy OR trade policy OR fiscal policy OR sanctions OR regulation";

pub const NO_NEWS_MESSAGE: &str = "No relevant political news found for the specified period.";

/// Outlets searched on NewsAPI
pub const NEWS_SOURCES: [&str; 5] = [
    "reuters",
    "bbc-news",
    "financial-times",
    "bloomberg",
    "the-economist",
];

const NEWS_DAYS: i64 = 3;
const NEWS_PAGE_SIZE: usize = 30;
const EXCLUDED_TERMS: &str = " -sports -entertainment";
const FEDERAL_REGISTER_DOCUMENTS: usize = 10;
const CONTEXT_ARTICLES: usize = 15;

#[derive(Debug, Clone, Serialize)]
pub struct PoliticalContext {
    pub news: Fetched<Vec<NewsArticle>>,
    pub federal_register: Fetched<Vec<NewsArticle>>,
}

impl PoliticalContext {
    /// Articles from both sources, wire news first, deduplicated by title
    pub fn articles(&self) -> Vec<NewsArticle> {
        let merged = [&self.news, &self.federal_register]
            .into_iter()
            .filter_map(Fetched::data)
            .flatten()
            .cloned()
            .collect();
        dedup_by_title(merged)
    }
}

/// Analyst for political events and government policy
pub struct PoliticalNewsAgent {
    runner: PromptRunner,
    news: Collector<NewsApiClient>,
    federal_register: Collector<FederalRegisterClient>,
    query: String,
}

impl PoliticalNewsAgent {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &EconomyConfig) -> Self {
        Self {
            runner: PromptRunner::new(provider, config, "PoliticalNewsAgent", SYSTEM_PROMPT)
                .with_failure_prefix("Error analyzing political news"),
            news: Collector::new("newsapi", NewsApiClient::from_config(config)),
            federal_register: Collector::new(
                "federal_register",
                FederalRegisterClient::from_config(config),
            ),
            query: DEFAULT_QUERY.to_string(),
        }
    }

    /// Search both sources with a different query
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub async fn collect(&self) -> PoliticalContext {
        let (news, federal_register) = tokio::join!(self.wire_news(), self.policy_documents());
        PoliticalContext {
            news: Fetched::capture("newsapi", news),
            federal_register: Fetched::capture("federal_register", federal_register),
        }
    }

    /// Analyze the collected articles; no model call when there are none
    pub async fn analyze(&self, context: &PoliticalContext, task: &str) -> Outcome {
        let articles = context.articles();
        if articles.is_empty() {
            tracing::info!(
                news_error = context.news.error(),
                federal_register_error = context.federal_register.error(),
                "no political news collected"
            );
            return Outcome::Success(NO_NEWS_MESSAGE.to_string());
        }

        tracing::debug!(articles = articles.len(), "analyzing political news");
        self.runner.complete(&build_prompt(&articles, task)).await
    }

    async fn wire_news(&self) -> Result<Vec<NewsArticle>> {
        let query = NewsQuery::new(format!("{}{EXCLUDED_TERMS}", self.query))
            .last_days(NEWS_DAYS)
            .sources(NEWS_SOURCES)
            .page_size(NEWS_PAGE_SIZE);
        self.news.get()?.search(&query).await
    }

    async fn policy_documents(&self) -> Result<Vec<NewsArticle>> {
        self.federal_register
            .get()?
            .documents(&self.query, FEDERAL_REGISTER_DOCUMENTS)
            .await
    }
}

#[async_trait]
impl Agent for PoliticalNewsAgent {
    async fn run(&self, task: &str) -> agent_core::Result<Outcome> {
        let context = self.collect().await;
        Ok(self.analyze(&context, task).await)
    }

    fn name(&self) -> &str {
        "PoliticalNewsAgent"
    }
}

/// Compose the political analysis prompt from deduplicated articles
pub fn build_prompt(articles: &[NewsArticle], task: &str) -> String {
    let context = format!(
        "Recent political news and government policies:\n{}",
        format_article_context(articles, CONTEXT_ARTICLES, DEFAULT_DESCRIPTION_CHARS)
    );
    format!(
        "{task}\n\n\
         Here is the recent political and economic news to analyze:\n\n\
         {context}\n\
         Provide a comprehensive analysis of how these political developments might impact economic conditions, \
         markets, and different sectors of the economy. Focus on the most significant implications.",
        task = task_or(task, DEFAULT_TASK),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysts::test_support::ScriptedProvider;

    fn article(title: &str, description: &str) -> NewsArticle {
        NewsArticle {
            title: title.to_string(),
            description: description.to_string(),
            ..NewsArticle::default()
        }
    }

    fn agent(provider: Arc<ScriptedProvider>) -> PoliticalNewsAgent {
        PoliticalNewsAgent::new(provider, &EconomyConfig::default())
    }

    #[test]
    fn test_articles_merge_and_dedup() {
        let ctx = PoliticalContext {
            news: Fetched::Data(vec![
                article("New Tariffs Announced", "Wire story"),
                article("Sanctions Expanded", "Wire story"),
            ]),
            federal_register: Fetched::Data(vec![
                article("new tariffs announced", "Register notice"),
                article("Export Controls Rule", "Register notice"),
            ]),
        };

        let titles: Vec<String> = ctx.articles().into_iter().map(|a| a.title).collect();
        assert_eq!(
            titles,
            vec!["New Tariffs Announced", "Sanctions Expanded", "Export Controls Rule"]
        );
    }

    #[test]
    fn test_prompt_limits_context() {
        let articles: Vec<NewsArticle> = (1..=20)
            .map(|i| article(&format!("Story {i}"), &"x".repeat(300)))
            .collect();
        let prompt = build_prompt(&articles, "");

        assert!(prompt.starts_with(DEFAULT_TASK));
        assert!(prompt.contains("Recent political news and government policies:\n1. Story 1: "));
        assert!(prompt.contains("15. Story 15: "));
        assert!(!prompt.contains("16. Story 16"));
        assert!(prompt.contains(&format!("{}...\n\n", "x".repeat(200))));
        assert!(!prompt.contains(&"x".repeat(201)));
    }

    #[tokio::test]
    async fn test_no_articles_skips_model() {
        let provider = ScriptedProvider::replying(["should not be used"]);
        let ctx = PoliticalContext {
            news: Fetched::failed("Configuration error: NEWS_API_KEY is not configured"),
            federal_register: Fetched::Data(Vec::new()),
        };

        let outcome = agent(provider.clone()).analyze(&ctx, "").await;
        assert_eq!(outcome, Outcome::Success(NO_NEWS_MESSAGE.to_string()));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_partial_sources_still_analyzed() {
        let provider = ScriptedProvider::replying(["Tariffs weigh on trade. <DONE>"]);
        let ctx = PoliticalContext {
            news: Fetched::failed("Configuration error: NEWS_API_KEY is not configured"),
            federal_register: Fetched::Data(vec![article("Export Controls Rule", "New rule")]),
        };

        let outcome = agent(provider.clone()).analyze(&ctx, "Focus on trade").await;
        assert_eq!(outcome, Outcome::Success("Tariffs weigh on trade.".to_string()));

        let prompt = provider.last_request().unwrap().last_user_text().unwrap().to_string();
        assert!(prompt.starts_with("Focus on trade\n\n"));
        assert!(prompt.contains("1. Export Controls Rule: New rule...\n\n"));
    }

    #[tokio::test]
    async fn test_provider_failure_prefix() {
        let provider = ScriptedProvider::failing(agent_llm::LLMError::AuthenticationFailed);
        let ctx = PoliticalContext {
            news: Fetched::Data(vec![article("Budget Deal", "Congress passes budget")]),
            federal_register: Fetched::Data(Vec::new()),
        };

        let outcome = agent(provider).analyze(&ctx, "").await;
        assert_eq!(
            outcome,
            Outcome::Failed(
                "Error analyzing political news: Invalid API key or authentication failed".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_missing_news_key() {
        let provider = ScriptedProvider::replying(Vec::<String>::new());
        let err = agent(provider).wire_news().await.unwrap_err();
        assert!(err.to_string().contains("NEWS_API_KEY"));
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_federal_register_live() {
        let provider = ScriptedProvider::replying(Vec::<String>::new());
        let documents = agent(provider).policy_documents().await.unwrap();
        assert!(documents.len() <= FEDERAL_REGISTER_DOCUMENTS);
    }
}
