//! Economic summary agents
//!
//! This crate gathers economic and market data from public sources, hands it
//! to domain analysts backed by an LLM provider, and aggregates their
//! analyses into one economic summary:
//!
//! - Data collectors for FRED, Yahoo Finance, NewsAPI, the Federal Register,
//!   SEC EDGAR and Finnhub
//! - Pure derivations: indicator trends, recession risk, yield curve shape,
//!   price statistics, news deduplication
//! - Domain analysts: macro, equities, fixed income, commodities, political
//! - `EconomicSummarySwarm`, running the analysts sequentially or as a
//!   two-layer mixture before the aggregator synthesizes
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_economy::{EconomicSummarySwarm, EconomyConfig, analysts};
//! use agent_llm::providers::OpenAIProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EconomyConfig::from_env()?;
//!     let provider = Arc::new(OpenAIProvider::new(config.openai_api_key.clone().unwrap_or_default())?);
//!
//!     let aggregator = Arc::new(analysts::AggregatorAgent::new(provider.clone(), &config));
//!     let mut swarm = EconomicSummarySwarm::new(aggregator);
//!     for domain in analysts::DOMAINS {
//!         swarm.register(domain, analysts::analyst_for(domain, provider.clone(), &config)?);
//!     }
//!
//!     println!("{}", swarm.run_with_mixture("").await);
//!     Ok(())
//! }
//! ```

pub mod analysts;
pub mod api;
pub mod config;
pub mod data;
pub mod debug_log;
pub mod error;
pub mod indicators;
pub mod market;
pub mod news;
pub mod reports;
pub mod swarm;
pub mod yield_curve;

pub use analysts::{
    AggregatorAgent, CommoditiesAgent, EquitiesAgent, FixedIncomeAgent, MacroAgent,
    PoliticalNewsAgent, PromptRunner, analyst_for,
};
pub use config::{EconomyConfig, EconomyConfigBuilder};
pub use data::{Fetched, Sections};
pub use debug_log::DebugLog;
pub use error::{EconomyError, Result};
pub use swarm::{
    AggregationRequest, AggregationResult, DomainInsight, EconomicSummarySwarm, InsightStatus,
    TruncationPolicy,
};
