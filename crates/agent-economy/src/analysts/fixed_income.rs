//! Fixed income analyst: Treasury curve, inversions and bond ETFs

use super::{Collector, PromptRunner, task_or};
use crate::api::MarketDataClient;
use crate::config::EconomyConfig;
use crate::data::{Fetched, Sections};
use crate::error::EconomyError;
use crate::market::PriceStats;
use crate::yield_curve::{CurveShape, Inversions, Tenor, YieldCurvePoint};
use agent_core::{Agent, Outcome};
use agent_llm::LLMProvider;
use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = r#"You are the FixedIncomeAgent, a specialized financial analyst focused on bond markets and interest rates.

Your role is to:
- Analyze Treasury yields and the yield curve
- Evaluate corporate, high-yield (junk), and municipal bond markets
- Identify inversions and their implications for the economy
- Assess interest rate trends and their impact on different sectors
- Provide insights on credit spreads and risk sentiment
- Connect fixed income developments to broader economic conditions

Your analysis should be data-driven, balanced, and insightful. Explain the significance
of yield curve shapes, credit spreads and trends for investors and the overall economy.

Format your response using markdown for readability.
End your analysis with "<DONE>" when complete."#;

pub const DEFAULT_TASK: &str =
    "Provide a comprehensive analysis of the fixed income market based on this data.";

/// Bond ETFs as (label, symbol, display name)
pub const BOND_ETFS: [(&str, &str, &str); 3] = [
    ("Corporate", "LQD", "Corporate Bonds"),
    ("Junk", "JNK", "High Yield Bonds"),
    ("Municipal", "MUB", "Municipal Bonds"),
];

const HISTORY_DAYS: i64 = 30;

/// Collected fixed income data
#[derive(Debug, Clone, Serialize)]
pub struct FixedIncomeContext {
    /// Latest yield per tenor, in [`Tenor::ALL`] order
    pub yields: Vec<(Tenor, Fetched<f64>)>,
    /// Keyed by ETF label
    pub bond_etfs: Sections<PriceStats>,
}

impl FixedIncomeContext {
    /// Known points of the curve
    pub fn curve(&self) -> Vec<YieldCurvePoint> {
        self.yields
            .iter()
            .filter_map(|(tenor, fetched)| {
                fetched.data().map(|&yield_pct| YieldCurvePoint {
                    tenor: *tenor,
                    yield_pct,
                })
            })
            .collect()
    }

    pub fn shape(&self) -> CurveShape {
        CurveShape::from_curve(&self.curve())
    }

    pub fn inversions(&self) -> Inversions {
        Inversions::from_curve(&self.curve())
    }
}

/// Analyst for Treasury yields and bond markets
pub struct FixedIncomeAgent {
    runner: PromptRunner,
    market: Collector<MarketDataClient>,
}

impl FixedIncomeAgent {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &EconomyConfig) -> Self {
        Self {
            runner: PromptRunner::new(provider, config, "FixedIncomeAgent", SYSTEM_PROMPT)
                .with_failure_prefix("Error generating fixed income analysis"),
            market: Collector::new("yahoo", MarketDataClient::new()),
        }
    }

    pub async fn collect(&self) -> FixedIncomeContext {
        let (yields, bond_etfs) = tokio::join!(self.treasury_yields(), self.bond_etf_performance());
        FixedIncomeContext { yields, bond_etfs }
    }

    pub async fn analyze(&self, context: &FixedIncomeContext, task: &str) -> Outcome {
        self.runner.complete(&build_prompt(context, task)).await
    }

    async fn treasury_yields(&self) -> Vec<(Tenor, Fetched<f64>)> {
        let client = match self.market.get() {
            Ok(client) => client,
            Err(e) => {
                return Tenor::ALL
                    .iter()
                    .map(|tenor| (*tenor, Fetched::failed(&e)))
                    .collect();
            }
        };

        let closes = join_all(Tenor::ALL.iter().map(|tenor| async move {
            let bars = client.history(tenor.ticker(), HISTORY_DAYS).await?;
            bars.last()
                .map(|bar| crate::market::round2(bar.close))
                .ok_or_else(|| EconomyError::unavailable(tenor.description(), "empty history"))
        }))
        .await;

        Tenor::ALL
            .iter()
            .zip(closes)
            .map(|(tenor, close)| (*tenor, Fetched::capture(tenor.label(), close)))
            .collect()
    }

    async fn bond_etf_performance(&self) -> Sections<PriceStats> {
        let client = match self.market.get() {
            Ok(client) => client,
            Err(e) => {
                return BOND_ETFS
                    .iter()
                    .map(|(label, _, _)| ((*label).to_string(), Fetched::failed(&e)))
                    .collect();
            }
        };

        let stats = join_all(BOND_ETFS.iter().map(|&(_, symbol, _)| async move {
            let bars = client.history(symbol, HISTORY_DAYS).await?;
            if bars.len() < 2 {
                return Err(EconomyError::unavailable(symbol, "not enough price history"));
            }
            PriceStats::from_bars(&bars)
                .ok_or_else(|| EconomyError::unavailable(symbol, "empty history"))
        }))
        .await;

        BOND_ETFS
            .iter()
            .zip(stats)
            .map(|(&(label, symbol, _), stats)| (label.to_string(), Fetched::capture(symbol, stats)))
            .collect()
    }
}

#[async_trait]
impl Agent for FixedIncomeAgent {
    async fn run(&self, task: &str) -> agent_core::Result<Outcome> {
        let context = self.collect().await;
        Ok(self.analyze(&context, task).await)
    }

    fn name(&self) -> &str {
        "FixedIncomeAgent"
    }
}

fn fetched_or_na<T>(fetched: Option<&Fetched<T>>, render: impl Fn(&T) -> String) -> String {
    match fetched {
        Some(Fetched::Data(data)) => render(data),
        Some(Fetched::Failed { error }) => format!("N/A ({error})"),
        None => "N/A".to_string(),
    }
}

/// Compose the fixed income analysis prompt
pub fn build_prompt(context: &FixedIncomeContext, task: &str) -> String {
    let mut prompt = String::from("Analyze the following fixed income data and provide insights:\n\n");

    prompt.push_str("TREASURY YIELD CURVE:\n");
    prompt.push_str(&format!("- Shape: {}\n", context.shape().as_str()));
    for tenor in Tenor::ALL {
        let fetched = context
            .yields
            .iter()
            .find(|(t, _)| *t == tenor)
            .map(|(_, f)| f);
        prompt.push_str(&format!(
            "- {}: {}\n",
            tenor.description(),
            fetched_or_na(fetched, |y| format!("{y:.2}%"))
        ));
    }

    let inversions = context.inversions();
    prompt.push_str("\nINVERSIONS:\n");
    prompt.push_str(&format!(
        "- Any Inversions Detected: {}\n",
        if inversions.any_inverted { "Yes" } else { "No" }
    ));
    for (long, short) in Inversions::PAIRS {
        let name = format!("{}-{}", long.label(), short.label());
        let spread = inversions
            .spread(&name)
            .map_or_else(|| "N/A".to_string(), |s| format!("{s:.2}"));
        prompt.push_str(&format!("- {name} Spread: {spread}\n"));
    }

    prompt.push_str("\nBOND ETFs:\n");
    for (label, symbol, display) in BOND_ETFS {
        let fetched = context.bond_etfs.get(label);
        let price = fetched_or_na(fetched, |s| format!("{:.2}", s.current_price));
        let change = match fetched {
            Some(Fetched::Data(stats)) => format!("{:.2}%", stats.price_change_pct),
            _ => "N/A".to_string(),
        };
        prompt.push_str(&format!("- {display} ({symbol}): {price}, 30-day change: {change}\n"));
    }

    prompt.push_str(&format!(
        "\n{}\n\n\
         Your analysis should cover:\n\
         1. Current state of the yield curve and its implications\n\
         2. Significance of any inversions detected\n\
         3. Performance of different bond sectors (Treasury, Corporate, High Yield, Municipal)\n\
         4. Impact of yield trends on different sectors of the economy\n\
         5. Outlook for interest rates and bond markets",
        task_or(task, DEFAULT_TASK)
    ));
    prompt
}
