//! Aggregator that synthesizes the domain insights into one summary

use super::PromptRunner;
use crate::config::EconomyConfig;
use crate::swarm::{domain_section, summary_fallback};
use agent_core::{Agent, Outcome};
use agent_llm::LLMProvider;
use async_trait::async_trait;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = r#"You are an Economic Summary Aggregator Agent responsible for synthesizing insights from multiple
domain-specific economic analyses into a comprehensive, cohesive economic overview.

Your task is to:
1. Integrate insights from various economic domains (equities, fixed income, macroeconomics,
   commodities, political news)
2. Identify connections, correlations, and contradictions between different domains
3. Prioritize the most significant economic trends and developments
4. Synthesize a balanced, comprehensive economic summary
5. Highlight key risks and opportunities in the current economic environment

When synthesizing information:
- Maintain a balanced perspective that considers all domains
- Identify how developments in one domain may impact others
- Resolve apparent contradictions by providing context and nuance
- Distinguish between leading and lagging indicators
- Consider both short-term fluctuations and long-term trends
- Avoid political bias or speculation not supported by the data

Format your response as a structured economic summary with clear sections,
including an executive summary, domain-specific insights, cross-domain analysis,
and outlook. Use bullet points where appropriate for clarity.

End your analysis with "<DONE>" when complete."#;

/// Synthesizes domain summaries into the final economic summary
pub struct AggregatorAgent {
    runner: PromptRunner,
}

impl AggregatorAgent {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &EconomyConfig) -> Self {
        Self {
            runner: PromptRunner::new(provider, config, "AggregatorAgent", SYSTEM_PROMPT)
                .with_fallback(summary_fallback("AggregatorAgent"))
                .with_failure_prefix("Error synthesizing economic summary"),
        }
    }

    /// Synthesize a list of `(domain, summary)` pairs directly
    pub async fn synthesize(&self, summaries: &[(&str, &str)]) -> Outcome {
        self.runner.complete(&build_prompt(&format_summaries(summaries))).await
    }
}

#[async_trait]
impl Agent for AggregatorAgent {
    /// `task` carries the domain insights, already formatted by the swarm
    async fn run(&self, task: &str) -> agent_core::Result<Outcome> {
        Ok(self.runner.complete(&build_prompt(task)).await)
    }

    fn name(&self) -> &str {
        "AggregatorAgent"
    }
}

/// `"\n\n{DOMAIN} DOMAIN SUMMARY:\n{summary}"` for each pair, in order
pub fn format_summaries(summaries: &[(&str, &str)]) -> String {
    summaries
        .iter()
        .map(|(domain, summary)| format!("\n\n{}", domain_section(domain, summary)))
        .collect()
}

pub fn build_prompt(insights: &str) -> String {
    format!(
        "Please synthesize the following domain-specific economic analyses into a comprehensive economic summary:\n\n\
         {insights}\n\n\
         Based on these domain insights, provide a cohesive economic overview that identifies connections, \
         correlations, and contradictions between different domains. Prioritize the most significant economic \
         trends and highlight key risks and opportunities in the current economic environment."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysts::test_support::ScriptedProvider;
    use agent_llm::LLMError;

    #[test]
    fn test_format_summaries() {
        let formatted = format_summaries(&[("macro", "Growth slowing."), ("fixed_income", "Curve inverted.")]);
        assert_eq!(
            formatted,
            "\n\nMACRO DOMAIN SUMMARY:\nGrowth slowing.\n\nFIXED_INCOME DOMAIN SUMMARY:\nCurve inverted."
        );
    }

    #[tokio::test]
    async fn test_run_wraps_insights() {
        let provider = ScriptedProvider::replying(["Overall the economy is cooling.\n<DONE>"]);
        let aggregator = AggregatorAgent::new(provider.clone(), &EconomyConfig::default());

        let outcome = aggregator.run("=== DOMAIN INSIGHTS ===").await.unwrap();
        assert_eq!(outcome, Outcome::Success("Overall the economy is cooling.".to_string()));

        let prompt = provider.last_request().unwrap().last_user_text().unwrap().to_string();
        assert!(prompt.starts_with(
            "Please synthesize the following domain-specific economic analyses into a comprehensive economic summary:\n\n=== DOMAIN INSIGHTS ==="
        ));
        assert!(prompt.ends_with("key risks and opportunities in the current economic environment."));
    }

    #[tokio::test]
    async fn test_synthesize_pairs() {
        let provider = ScriptedProvider::replying(["Summary"]);
        let aggregator = AggregatorAgent::new(provider.clone(), &EconomyConfig::default());

        let outcome = aggregator.synthesize(&[("equities", "Stocks up.")]).await;
        assert!(outcome.is_success());
        let prompt = provider.last_request().unwrap().last_user_text().unwrap().to_string();
        assert!(prompt.contains("\n\nEQUITIES DOMAIN SUMMARY:\nStocks up.\n\n"));
    }

    #[tokio::test]
    async fn test_empty_reply_uses_summary_fallback() {
        let provider = ScriptedProvider::replying([""]);
        let aggregator = AggregatorAgent::new(provider, &EconomyConfig::default());
        let outcome = aggregator.run("insights").await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Degraded(
                "The AggregatorAgent was unable to generate a proper summary. Please check the logs for details."
                    .to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_failure_prefix() {
        let provider = ScriptedProvider::failing(LLMError::InvalidRequest("context too long".to_string()));
        let aggregator = AggregatorAgent::new(provider, &EconomyConfig::default());
        let outcome = aggregator.run("insights").await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Failed("Error synthesizing economic summary: Invalid request: context too long".to_string())
        );
    }
}
