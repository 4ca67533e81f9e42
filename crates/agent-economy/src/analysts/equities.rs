//! Equities analyst: indices, sector ETFs, earnings, filings and news

use super::{Collector, PromptRunner, task_or};
use crate::api::{
    EarningsEvent, FilingType, FinnhubClient, MarketDataClient, NewsApiClient, NewsQuery,
    SecEdgarClient, SecFiling,
};
use crate::config::EconomyConfig;
use crate::data::{Fetched, Sections};
use crate::error::{EconomyError, Result};
use crate::market::{InstrumentKind, InstrumentSummary, rank_by_performance};
use crate::news::NewsArticle;
use agent_core::{Agent, Outcome};
use agent_llm::LLMProvider;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = r#"You are an Equities Market Analysis Agent. You analyze stock market data, corporate filings
(such as SEC 10-K reports) and relevant financial news to explain what is happening in the equities market.

Focus on these key areas:
1. Major index performance (S&P 500, Nasdaq, Dow Jones): trends, key levels and driving factors
2. Sector performance: leading and lagging sectors and the reasons behind them
3. Earnings: notable upcoming or recent reports and what they signal
4. SEC filings: company performance, risks and outlook disclosed in annual reports
5. Financial news: how current events are moving the market or specific sectors
6. Overall market sentiment and outlook

For each analysis:
- Work from the provided market data, filing details and news summaries
- Identify significant trends, patterns and anomalies
- Explain the impact on investors and the broader market
- Keep the summary concise and data-driven
- Avoid speculation the data does not support

Structure the response in clear sections.
End your analysis with "<DONE>" when complete."#;

pub const DEFAULT_TASK: &str = "Provide a general equities market overview";

const FALLBACK: &str =
    "The EquitiesAgent was unable to generate a proper analysis. Please check the logs.";

/// Major US indices
pub const INDICES: [(&str, &str); 3] = [
    ("^GSPC", "S&P 500"),
    ("^IXIC", "NASDAQ Composite"),
    ("^DJI", "Dow Jones Industrial Average"),
];

/// Select Sector SPDR ETFs
pub const SECTOR_ETFS: [(&str, &str); 11] = [
    ("XLK", "Technology"),
    ("XLF", "Financials"),
    ("XLV", "Health Care"),
    ("XLY", "Consumer Discretionary"),
    ("XLP", "Consumer Staples"),
    ("XLE", "Energy"),
    ("XLI", "Industrials"),
    ("XLU", "Utilities"),
    ("XLB", "Materials"),
    ("XLRE", "Real Estate"),
    ("XLC", "Communication Services"),
];

/// Companies sampled for earnings and filings
pub const SAMPLE_TICKERS: [&str; 5] = ["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA"];

const PERIOD_DAYS: i64 = 30;
const EARNINGS_LOOKAHEAD_DAYS: i64 = 7;
const FILINGS_PER_TICKER: usize = 1;
const NEWS_QUERY: &str = "stock market OR equities OR corporate earnings OR Wall Street";
const NEWS_ARTICLES: usize = 5;

/// Next earnings release for a sampled ticker within the lookahead window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsLookahead {
    pub symbol: String,
    /// `None` when nothing is scheduled in the window
    pub next_release: Option<EarningsEvent>,
}

/// Everything the equities analyst collected for one run
#[derive(Debug, Clone, Serialize)]
pub struct EquitiesContext {
    /// Keyed by symbol; indices first, then sector ETFs
    pub market: Sections<InstrumentSummary>,
    pub earnings: Fetched<Vec<EarningsLookahead>>,
    /// Keyed by ticker
    pub filings: Sections<Vec<SecFiling>>,
    pub news: Fetched<Vec<NewsArticle>>,
}

impl EquitiesContext {
    /// Sector names with their period change, best first
    pub fn sector_ranking(&self) -> Vec<(String, f64)> {
        rank_by_performance(
            self.market
                .available()
                .map(|(_, summary)| summary)
                .filter(|summary| summary.kind == InstrumentKind::SectorEtf),
        )
    }
}

/// Analyst for stock indices, sectors and corporate news
pub struct EquitiesAgent {
    runner: PromptRunner,
    market: Collector<MarketDataClient>,
    finnhub: Collector<FinnhubClient>,
    sec: Collector<SecEdgarClient>,
    news: Collector<NewsApiClient>,
}

impl EquitiesAgent {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &EconomyConfig) -> Self {
        Self {
            runner: PromptRunner::new(provider, config, "EquitiesAgent", SYSTEM_PROMPT)
                .with_fallback(FALLBACK)
                .with_failure_prefix("Error analyzing equities market data"),
            market: Collector::new("yahoo", MarketDataClient::new()),
            finnhub: Collector::new("finnhub", FinnhubClient::from_config(config)),
            sec: Collector::new("sec_edgar", SecEdgarClient::from_config(config)),
            news: Collector::new("newsapi", NewsApiClient::from_config(config)),
        }
    }

    pub async fn collect(&self) -> EquitiesContext {
        let (market, earnings, filings, news) = tokio::join!(
            self.market_overview(),
            self.earnings_lookahead(),
            self.annual_filings(),
            self.financial_news(),
        );

        EquitiesContext {
            market,
            earnings: Fetched::capture("earnings", earnings),
            filings,
            news: Fetched::capture("news", news),
        }
    }

    pub async fn analyze(&self, context: &EquitiesContext, task: &str) -> Outcome {
        self.runner.complete(&build_prompt(context, task)).await
    }

    async fn market_overview(&self) -> Sections<InstrumentSummary> {
        let instruments: Vec<(&str, &str, InstrumentKind)> = INDICES
            .iter()
            .map(|(symbol, name)| (*symbol, *name, InstrumentKind::Index))
            .chain(
                SECTOR_ETFS
                    .iter()
                    .map(|(symbol, name)| (*symbol, *name, InstrumentKind::SectorEtf)),
            )
            .collect();

        let client = match self.market.get() {
            Ok(client) => client,
            Err(e) => {
                let message = e.to_string();
                return instruments
                    .iter()
                    .map(|(symbol, _, _)| ((*symbol).to_string(), Fetched::failed(&message)))
                    .collect();
            }
        };

        let histories = join_all(
            instruments
                .iter()
                .map(|(symbol, _, _)| client.history(symbol, PERIOD_DAYS)),
        )
        .await;

        instruments
            .iter()
            .zip(histories)
            .map(|(&(symbol, name, kind), bars)| {
                let summary = bars.and_then(|bars| {
                    InstrumentSummary::from_bars(symbol, name, kind, &bars)
                        .ok_or_else(|| EconomyError::unavailable(symbol, "empty history"))
                });
                (symbol.to_string(), Fetched::capture(symbol, summary))
            })
            .collect()
    }

    async fn earnings_lookahead(&self) -> Result<Vec<EarningsLookahead>> {
        let finnhub = self.finnhub.get()?;
        let today = Utc::now().date_naive();
        let until = today + ChronoDuration::days(EARNINGS_LOOKAHEAD_DAYS);

        let calendar = finnhub.earnings_calendar(today, until, None).await?;
        Ok(upcoming_earnings(&calendar, &SAMPLE_TICKERS))
    }

    async fn annual_filings(&self) -> Sections<Vec<SecFiling>> {
        let lookup = match self.sec.get() {
            Ok(sec) => sec.company_tickers().await.map(|ciks| (sec, ciks)),
            Err(e) => Err(e),
        };

        let (sec, ciks) = match lookup {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "SEC ticker lookup failed");
                let message = e.to_string();
                return SAMPLE_TICKERS
                    .iter()
                    .map(|ticker| ((*ticker).to_string(), Fetched::failed(&message)))
                    .collect();
            }
        };

        let mut sections = Sections::new();
        for ticker in SAMPLE_TICKERS {
            let filings = match ciks.get(ticker) {
                Some(cik) => {
                    sec.get_filings(cik, Some(FilingType::Form10K), FILINGS_PER_TICKER)
                        .await
                }
                None => Err(EconomyError::unavailable(ticker, "ticker not found in SEC company list")),
            };
            let filings = filings.and_then(|filings| {
                if filings.is_empty() {
                    Err(EconomyError::unavailable(ticker, "no recent 10-K filings found"))
                } else {
                    Ok(filings)
                }
            });
            sections.push(ticker, Fetched::capture(ticker, filings));
        }
        sections
    }

    async fn financial_news(&self) -> Result<Vec<NewsArticle>> {
        let query = NewsQuery::new(NEWS_QUERY).page_size(NEWS_ARTICLES);
        self.news.get()?.search(&query).await
    }
}

#[async_trait]
impl Agent for EquitiesAgent {
    async fn run(&self, task: &str) -> agent_core::Result<Outcome> {
        let context = self.collect().await;
        Ok(self.analyze(&context, task).await)
    }

    fn name(&self) -> &str {
        "EquitiesAgent"
    }
}

/// First scheduled release per ticker, in ticker order
pub fn upcoming_earnings(calendar: &[EarningsEvent], tickers: &[&str]) -> Vec<EarningsLookahead> {
    tickers
        .iter()
        .map(|ticker| EarningsLookahead {
            symbol: (*ticker).to_string(),
            next_release: calendar
                .iter()
                .filter(|event| event.symbol.eq_ignore_ascii_case(ticker))
                .min_by(|a, b| a.date.cmp(&b.date))
                .cloned(),
        })
        .collect()
}

fn format_ranking(ranking: &[(String, f64)]) -> String {
    if ranking.is_empty() {
        return "Not available".to_string();
    }
    ranking
        .iter()
        .enumerate()
        .map(|(i, (name, change))| format!("{}. {name}: {change:+.2}%", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compose the equities analysis prompt
pub fn build_prompt(context: &EquitiesContext, task: &str) -> String {
    format!(
        "Please analyze the following equities market data and provide insights:\n\n\
         Market Index & Sector ETF Overview (1mo Period):\n{market}\n\n\
         Sector Performance Ranking (1mo):\n{ranking}\n\n\
         Upcoming Earnings (next 7 days for sample tickers):\n{earnings}\n\n\
         Recent SEC Filings Insights (Latest 10-K):\n{filings}\n\n\
         Relevant Financial News Summaries:\n{news}\n\n\
         Based on this data, provide a comprehensive analysis of the current equities market situation.\n\
         Focus on:\n\
         - Major index trends (S&P 500, Nasdaq, Dow Jones).\n\
         - Key performing (leading/lagging) sectors and potential reasons.\n\
         - Notable upcoming earnings and their potential significance.\n\
         - Insights from recent SEC filings (if available).\n\
         - Impact of recent financial news.\n\
         - Overall market sentiment and outlook.\n\
         - {task}",
        market = context.market.to_prompt_json(),
        ranking = format_ranking(&context.sector_ranking()),
        earnings = context.earnings.to_prompt_json(),
        filings = context.filings.to_prompt_json(),
        news = context.news.to_prompt_json(),
        task = task_or(task, DEFAULT_TASK),
    )
}
