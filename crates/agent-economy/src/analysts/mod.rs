//! Domain analysts and the aggregator
//!
//! Every analyst follows the same path on each run: collect its data
//! sections (failures become inline errors), compose one prompt, send it
//! through a [`PromptRunner`] and return the resulting [`agent_core::Outcome`].

pub mod aggregator;
pub mod commodities;
pub mod equities;
pub mod fixed_income;
pub mod macro_analyst;
pub mod political;
pub mod runner;

pub use aggregator::AggregatorAgent;
pub use commodities::CommoditiesAgent;
pub use equities::EquitiesAgent;
pub use fixed_income::FixedIncomeAgent;
pub use macro_analyst::MacroAgent;
pub use political::PoliticalNewsAgent;
pub use runner::PromptRunner;

use crate::config::EconomyConfig;
use crate::error::{EconomyError, Result};
use agent_core::Agent;
use agent_llm::LLMProvider;
use std::sync::Arc;

/// Domains known to the swarm, in default registration order
pub const DOMAINS: [&str; 5] = ["macro", "equities", "fixed_income", "commodities", "political"];

/// Build the analyst for a domain name
pub fn analyst_for(
    domain: &str,
    provider: Arc<dyn LLMProvider>,
    config: &EconomyConfig,
) -> Result<Arc<dyn Agent>> {
    let analyst: Arc<dyn Agent> = match domain {
        "macro" => Arc::new(MacroAgent::new(provider, config)),
        "equities" => Arc::new(EquitiesAgent::new(provider, config)),
        "fixed_income" => Arc::new(FixedIncomeAgent::new(provider, config)),
        "commodities" => Arc::new(CommoditiesAgent::new(provider, config)),
        "political" => Arc::new(PoliticalNewsAgent::new(provider, config)),
        other => {
            return Err(EconomyError::ConfigError(format!(
                "unknown domain '{other}', expected one of: {}",
                DOMAINS.join(", ")
            )));
        }
    };
    Ok(analyst)
}

/// Caller's task, or the analyst's default when blank
pub(crate) fn task_or<'a>(task: &'a str, default: &'a str) -> &'a str {
    if task.trim().is_empty() { default } else { task }
}

/// A data client that may be missing its configuration
///
/// Construction failures are kept and reported by every section that needs
/// the client, so an analyst without a key still runs.
pub(crate) struct Collector<T> {
    inner: std::result::Result<T, String>,
}

impl<T> Collector<T> {
    pub(crate) fn new(name: &str, result: Result<T>) -> Self {
        let inner = result.map_err(|e| {
            tracing::warn!(collector = name, error = %e, "collector unavailable");
            e.to_string()
        });
        Self { inner }
    }

    pub(crate) fn get(&self) -> Result<&T> {
        self.inner
            .as_ref()
            .map_err(|reason| EconomyError::ConfigError(reason.clone()))
    }
}
