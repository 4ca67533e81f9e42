//! Commodities analyst: futures prices plus sector news

use super::{Collector, PromptRunner, task_or};
use crate::api::{MarketDataClient, NewsApiClient, NewsQuery};
use crate::config::EconomyConfig;
use crate::data::{Fetched, Sections};
use crate::error::{EconomyError, Result};
use crate::market::PriceStats;
use crate::news::NewsArticle;
use agent_core::{Agent, Outcome};
use agent_llm::LLMProvider;
use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = r#"You are the CommoditiesAgent, a specialized financial analyst focused on commodity markets.

Your role is to:
- Analyze metals, energy, and agricultural commodities markets
- Evaluate price trends and market dynamics
- Identify supply and demand factors affecting commodities
- Assess geopolitical risks impacting commodity prices
- Provide insights on commodity market outlook
- Connect commodity trends to broader economic conditions

Your analysis should be data-driven, balanced, and insightful. Explain the significance
of commodity price movements and trends for investors and the overall economy.

Format your response using markdown for readability.
End your analysis with "<DONE>" when complete."#;

pub const DEFAULT_TASK: &str =
    "Provide a comprehensive analysis of the commodities market based on this data.";

/// Appended to every topic brief
pub const GUARDRAIL: &str = "Cite all sources and dates. Do not make up facts or speculate. \
Only make statements that are directly supported by the provided data or reputable sources. \
If information is uncertain, say so explicitly. Never hallucinate or fabricate details.";

/// Front-month futures as (name, symbol)
pub const FUTURES: [(&str, &str); 11] = [
    ("Crude Oil", "CL=F"),
    ("Brent Crude", "BZ=F"),
    ("Natural Gas", "NG=F"),
    ("Gold", "GC=F"),
    ("Silver", "SI=F"),
    ("Copper", "HG=F"),
    ("Corn", "ZC=F"),
    ("Soybeans", "ZS=F"),
    ("Wheat", "ZW=F"),
    ("Coffee", "KC=F"),
    ("Sugar #11", "SB=F"),
];

/// A news topic with its search query and brief
#[derive(Debug, Clone, Copy)]
pub struct NewsTopic {
    pub name: &'static str,
    pub query: &'static str,
    pub brief: &'static str,
}

pub const TOPICS: [NewsTopic; 6] = [
    NewsTopic {
        name: "metals",
        query: "metals mining commodities",
        brief: "Summarize the most relevant and impactful recent news for US metals and mining commodities. \
                Focus on domestic production updates, price movements, supply chain disruptions and \
                geopolitical factors affecting the U.S. metals market.",
    },
    NewsTopic {
        name: "energy",
        query: "oil gas energy commodities",
        brief: "Summarize the most relevant and impactful recent news for US energy commodities \
                (oil, gas, uranium, etc.). Emphasize market trends, policy decisions, infrastructure \
                developments and technological advancements impacting U.S. energy production and consumption.",
    },
    NewsTopic {
        name: "agriculture",
        query: "agriculture crops commodities",
        brief: "Summarize the most relevant and impactful recent news for US agricultural commodities. \
                Highlight crop reports, weather impacts, trade policies, pest outbreaks and market demand \
                affecting commodities like grains, soybeans, coffee, cocoa, sugar and cotton.",
    },
    NewsTopic {
        name: "macro",
        query: "macro",
        brief: "Summarize the most relevant and impactful recent US macroeconomic news influencing commodity \
                markets. Focus on interest rates, inflation data, currency fluctuations and economic \
                indicators that impact commodity pricing and demand.",
    },
    NewsTopic {
        name: "policy",
        query: "policy",
        brief: "Summarize the most relevant and impactful recent US policy and regulatory news affecting \
                commodity markets. Focus on tariffs, environmental regulations, subsidies and trade \
                agreements that influence commodity production and trade.",
    },
    NewsTopic {
        name: "tech",
        query: "tech",
        brief: "Summarize the most relevant and impactful recent news on technology and innovation in the US \
                commodities sector. Focus on advancements in extraction, processing, alternative materials \
                and sustainability initiatives that are changing how commodities are produced and consumed.",
    },
];

const HISTORY_DAYS: i64 = 30;
const NEWS_DAYS: i64 = 7;
const ARTICLES_PER_TOPIC: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct CommoditiesContext {
    /// Keyed by commodity name
    pub prices: Sections<PriceStats>,
    /// Keyed by topic name; failed as a whole when the news client is unavailable
    pub news: Fetched<Sections<Vec<NewsArticle>>>,
}

/// Analyst for energy, metals and agricultural markets
pub struct CommoditiesAgent {
    runner: PromptRunner,
    market: Collector<MarketDataClient>,
    news: Collector<NewsApiClient>,
}

impl CommoditiesAgent {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &EconomyConfig) -> Self {
        Self {
            runner: PromptRunner::new(provider, config, "CommoditiesAgent", SYSTEM_PROMPT)
                .with_failure_prefix("Error analyzing commodities market data"),
            market: Collector::new("yahoo", MarketDataClient::new()),
            news: Collector::new("newsapi", NewsApiClient::from_config(config)),
        }
    }

    pub async fn collect(&self) -> CommoditiesContext {
        let (prices, news) = tokio::join!(self.prices(), self.topic_news());
        CommoditiesContext {
            prices,
            news: Fetched::capture("commodity news", news),
        }
    }

    pub async fn analyze(&self, context: &CommoditiesContext, task: &str) -> Outcome {
        self.runner.complete(&build_prompt(context, task)).await
    }

    async fn prices(&self) -> Sections<PriceStats> {
        let client = match self.market.get() {
            Ok(client) => client,
            Err(e) => {
                return FUTURES
                    .iter()
                    .map(|(name, _)| ((*name).to_string(), Fetched::failed(&e)))
                    .collect();
            }
        };

        let stats = join_all(FUTURES.iter().map(|&(name, symbol)| async move {
            let bars = client.history(symbol, HISTORY_DAYS).await?;
            PriceStats::from_bars(&bars).ok_or_else(|| {
                EconomyError::unavailable(format!("{name} ({symbol})"), "no historical data for period 1mo")
            })
        }))
        .await;

        FUTURES
            .iter()
            .zip(stats)
            .map(|(&(name, _), stats)| (name.to_string(), Fetched::capture(name, stats)))
            .collect()
    }

    async fn topic_news(&self) -> Result<Sections<Vec<NewsArticle>>> {
        let client = self.news.get()?;

        let results = join_all(TOPICS.iter().map(|topic| {
            let query = NewsQuery::new(topic.query)
                .last_days(NEWS_DAYS)
                .page_size(ARTICLES_PER_TOPIC);
            async move { client.search(&query).await }
        }))
        .await;

        Ok(TOPICS
            .iter()
            .zip(results)
            .map(|(topic, articles)| (topic.name.to_string(), Fetched::capture(topic.name, articles)))
            .collect())
    }
}

#[async_trait]
impl Agent for CommoditiesAgent {
    async fn run(&self, task: &str) -> agent_core::Result<Outcome> {
        let context = self.collect().await;
        Ok(self.analyze(&context, task).await)
    }

    fn name(&self) -> &str {
        "CommoditiesAgent"
    }
}

/// Topic briefs, each carrying the citation guardrail
pub fn sector_focus() -> String {
    TOPICS
        .iter()
        .map(|topic| format!("- {}: {} {GUARDRAIL}", topic.name, topic.brief))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compose the commodities analysis prompt
pub fn build_prompt(context: &CommoditiesContext, task: &str) -> String {
    format!(
        "Analyze the following commodities market data and provide insights:\n\n\
         COMMODITY PRICES (Last Month):\n{prices}\n\n\
         RECENT NEWS BY SECTOR:\n{news}\n\n\
         SECTOR FOCUS:\n{focus}\n\n\
         {task}\n\n\
         Your analysis should cover:\n\
         1. Current state of major commodity markets (energy, metals, agriculture)\n\
         2. Significant price trends and their drivers\n\
         3. Impact of recent news on commodity markets\n\
         4. Outlook for key commodities\n\
         5. Implications for the broader economy",
        prices = context.prices.to_prompt_json(),
        news = context.news.to_prompt_json(),
        focus = sector_focus(),
        task = task_or(task, DEFAULT_TASK),
    )
}
