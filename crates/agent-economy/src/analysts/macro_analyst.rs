//! Macroeconomic analyst backed by FRED indicators and releases

use super::{Collector, PromptRunner, task_or};
use crate::api::{FredClient, ReportParser, SeriesPoint, SourceReleases, indicators, sources};
use crate::config::EconomyConfig;
use crate::data::{Fetched, Sections};
use crate::error::{EconomyError, Result};
use crate::indicators::{IndicatorSnapshot, RecessionPeriod, RecessionRisk, recession_periods};
use crate::reports::{DEFAULT_KEYWORDS, SourcedRelease, flatten_releases, rank_reports};
use agent_core::{Agent, Outcome};
use agent_llm::LLMProvider;
use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = r#"You are a Macroeconomic Analysis Agent specializing in interpreting economic indicators and trends.
You analyze data from FRED (Federal Reserve Economic Data) and explain the current state of the economy and its likely direction.

Focus on these key areas:
1. GDP growth and overall economic output
2. Inflation and price stability
3. Employment and labor market conditions
4. Interest rates and monetary policy
5. Consumer sentiment and spending
6. Industrial production and business activity
7. Housing market trends
8. Recession indicators and economic cycle positioning

For each analysis:
- Identify significant trends and changes in key indicators
- Explain what these changes mean for the overall economy
- Note warning signs as well as positive developments
- Consider how different economic factors interact
- Close with a concise summary of the macroeconomic outlook

Stay data-driven and balanced. Avoid political bias and speculation the data does not support.
Structure the response in clear sections, using bullet points where helpful.
End your analysis with "<DONE>" when complete."#;

pub const DEFAULT_TASK: &str = "Provide a general macroeconomic overview";

const INDICATOR_LOOKBACK_DAYS: i64 = 365;
const RECESSION_HISTORY_DAYS: i64 = 25 * 365;
const RELEASES_PER_SOURCE: usize = 5;
const IMPORTANT_REPORTS: usize = 3;
const REPORT_EXCERPT_CHARS: usize = 500;
const REPORT_SUMMARY_CHARS: usize = 100;
const NO_REPORT_ANALYSIS: &str = "No analysis available";

/// One-sentence reading of an important release
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub name: String,
    pub source: String,
    pub link: String,
    pub analysis: String,
}

/// Everything the macro analyst collected for one run
#[derive(Debug, Clone, Serialize)]
pub struct MacroContext {
    /// Keyed by FRED series id
    pub indicators: Fetched<Sections<IndicatorSnapshot>>,
    pub recession_risk: Fetched<RecessionRisk>,
    pub recession_history: Fetched<Vec<RecessionPeriod>>,
    pub recent_releases: Fetched<Vec<SourceReleases>>,
    pub important_reports: Fetched<Vec<ReportSummary>>,
}

/// Analyst for GDP, inflation, labor, rates and recession risk
pub struct MacroAgent {
    runner: PromptRunner,
    fred: Collector<FredClient>,
    reports: Collector<ReportParser>,
}

impl MacroAgent {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &EconomyConfig) -> Self {
        Self {
            runner: PromptRunner::new(provider, config, "MacroAgent", SYSTEM_PROMPT)
                .with_failure_prefix("Error analyzing macroeconomic data"),
            fred: Collector::new("fred", FredClient::from_config(config)),
            reports: Collector::new("report_parser", ReportParser::new(config.request_timeout)),
        }
    }

    /// Gather every data section; never fails
    pub async fn collect(&self) -> MacroContext {
        let (indicators, recession_risk, recession_history, recent_releases) = tokio::join!(
            self.key_indicators(),
            self.recession_risk(),
            self.recession_history(),
            self.recent_releases(),
        );

        let recent_releases = Fetched::capture("recent_releases", recent_releases);
        let important_reports = match recent_releases.data() {
            Some(groups) => Fetched::Data(self.summarize_important_reports(groups).await),
            None => Fetched::failed(recent_releases.error().unwrap_or_default()),
        };

        MacroContext {
            indicators: Fetched::capture("indicators", indicators),
            recession_risk: Fetched::capture("recession_risk", recession_risk),
            recession_history: Fetched::capture("recession_history", recession_history),
            recent_releases,
            important_reports,
        }
    }

    /// Run the analysis over already-collected data
    pub async fn analyze(&self, context: &MacroContext, task: &str) -> Outcome {
        self.runner.complete(&build_prompt(context, task)).await
    }

    async fn key_indicators(&self) -> Result<Sections<IndicatorSnapshot>> {
        let fred = self.fred.get()?;
        let series = join_all(
            indicators::KEY_INDICATORS
                .iter()
                .map(|id| fred.get_series(id, INDICATOR_LOOKBACK_DAYS)),
        )
        .await;

        Ok(indicators::KEY_INDICATORS
            .iter()
            .zip(series)
            .map(|(id, points)| {
                let title = indicators::title(id).unwrap_or(*id);
                let snapshot = points.and_then(|points| {
                    IndicatorSnapshot::from_series(title, &points)
                        .ok_or_else(|| EconomyError::unavailable(*id, "fewer than two observations"))
                });
                ((*id).to_string(), Fetched::capture(id, snapshot))
            })
            .collect())
    }

    async fn recession_risk(&self) -> Result<RecessionRisk> {
        let fred = self.fred.get()?;
        let (spread, unemployment, production) = tokio::join!(
            fred.get_series(indicators::YIELD_SPREAD, INDICATOR_LOOKBACK_DAYS),
            fred.get_series(indicators::UNEMPLOYMENT, INDICATOR_LOOKBACK_DAYS),
            fred.get_series(indicators::INDUSTRIAL_PRODUCTION, INDICATOR_LOOKBACK_DAYS),
        );

        if let (Err(e), Err(_), Err(_)) = (&spread, &unemployment, &production) {
            return Err(EconomyError::unavailable("recession risk", e.to_string()));
        }

        let values = |series: Result<Vec<SeriesPoint>>, id: &str| -> Vec<f64> {
            match series {
                Ok(points) => points.iter().map(|p| p.value).collect(),
                Err(e) => {
                    tracing::warn!(series_id = id, error = %e, "recession input unavailable");
                    Vec::new()
                }
            }
        };

        Ok(RecessionRisk::assess(
            &values(spread, indicators::YIELD_SPREAD),
            &values(unemployment, indicators::UNEMPLOYMENT),
            &values(production, indicators::INDUSTRIAL_PRODUCTION),
        ))
    }

    async fn recession_history(&self) -> Result<Vec<RecessionPeriod>> {
        let usrec = self
            .fred
            .get()?
            .get_series(indicators::RECESSION, RECESSION_HISTORY_DAYS)
            .await?;
        Ok(recession_periods(&usrec))
    }

    async fn recent_releases(&self) -> Result<Vec<SourceReleases>> {
        self.fred
            .get()?
            .get_recent_releases(&sources::DEFAULT_RELEASE_SOURCES, RELEASES_PER_SOURCE)
            .await
    }

    /// One-sentence summaries of the highest ranked releases that have a link
    async fn summarize_important_reports(&self, groups: &[SourceReleases]) -> Vec<ReportSummary> {
        let ranked = rank_reports(flatten_releases(groups), &DEFAULT_KEYWORDS);
        let top: Vec<SourcedRelease> = ranked
            .into_iter()
            .take(IMPORTANT_REPORTS)
            .filter(|r| r.release.link.as_deref().is_some_and(|l| !l.is_empty()))
            .collect();

        let mut summaries = Vec::with_capacity(top.len());
        for report in top {
            let link = report.release.link.clone().unwrap_or_default();
            tracing::info!(report = %report.release.name, source = %report.source, "summarizing report");

            let content = match self.reports.get() {
                Ok(parser) => parser.get_report_content(&link, REPORT_EXCERPT_CHARS).await,
                Err(e) => format!("Error retrieving content: {e}"),
            };
            let prompt = report_summary_prompt(&report.release.name, &report.source, &content);

            let analysis = match self.runner.generate(&prompt).await {
                Ok(text) if !text.is_empty() => shorten_summary(&text),
                Ok(_) => NO_REPORT_ANALYSIS.to_string(),
                Err(e) => {
                    tracing::warn!(report = %report.release.name, error = %e, "report summary failed");
                    NO_REPORT_ANALYSIS.to_string()
                }
            };

            summaries.push(ReportSummary {
                name: report.release.name,
                source: report.source,
                link,
                analysis,
            });
        }
        summaries
    }
}

#[async_trait]
impl Agent for MacroAgent {
    async fn run(&self, task: &str) -> agent_core::Result<Outcome> {
        let context = self.collect().await;
        Ok(self.analyze(&context, task).await)
    }

    fn name(&self) -> &str {
        "MacroAgent"
    }
}

fn report_summary_prompt(name: &str, source: &str, content: &str) -> String {
    format!(
        "Please provide a ONE SENTENCE summary of this economic report:\n\n\
         Report: {name}\n\
         Source: {}\n\n\
         Content Excerpt:\n{content}\n\n\
         Your response should be a single sentence (maximum 50 words) that captures the most \
         important economic insight from this report.",
        source.to_uppercase()
    )
}

/// Cap a report summary at 100 characters plus `"..."`
fn shorten_summary(text: &str) -> String {
    if text.chars().count() > REPORT_SUMMARY_CHARS {
        let head: String = text.chars().take(REPORT_SUMMARY_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

/// Compose the macro analysis prompt
pub fn build_prompt(context: &MacroContext, task: &str) -> String {
    let mut report_analysis = String::new();
    if let Some(reports) = context.important_reports.data() {
        report_analysis.push_str("\nAnalysis of Important Recent Reports:\n");
        for (i, report) in reports.iter().enumerate() {
            report_analysis.push_str(&format!(
                "\n--- Report {}: {} ({}) ---\n{}\n",
                i + 1,
                report.name,
                report.source.to_uppercase(),
                report.analysis
            ));
        }
    }

    format!(
        "Please analyze the following macroeconomic data and provide insights:\n\n\
         Economic Indicators Analysis:\n{indicators}\n\n\
         Recession Risk Assessment:\n{risk}\n\n\
         Recession Periods (USREC, last 25 years):\n{history}\n\n\
         Recent Economic Reports:\n{releases}\n\
         {report_analysis}\n\
         Based on this data, provide a comprehensive analysis of the current macroeconomic situation, \
         key trends, and outlook. Include specific insights about GDP, inflation, employment, \
         interest rates, and recession risk.\n\n\
         If there is a specific task to focus on, it is: {task}",
        indicators = json(&context.indicators),
        risk = json(&context.recession_risk),
        history = json(&context.recession_history),
        releases = json(&context.recent_releases),
        task = task_or(task, DEFAULT_TASK),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysts::test_support::ScriptedProvider;
    use crate::api::Release;
    use crate::indicators::{RiskLevel, Trend};
    use chrono::NaiveDate;

    fn snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            name: "Unemployment Rate".to_string(),
            current_value: 4.1,
            previous_value: Some(4.0),
            change_pct: Some(2.5),
            trend: Trend::Up,
            data_points: 12,
            as_of_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    fn context() -> MacroContext {
        let mut indicators = Sections::new();
        indicators.push("UNRATE", Fetched::Data(snapshot()));
        indicators.push("GDP", Fetched::failed("No data available for GDP: fewer than two observations"));

        MacroContext {
            indicators: Fetched::Data(indicators),
            recession_risk: Fetched::Data(RecessionRisk {
                risk_level: RiskLevel::Moderate,
                risk_factors: 1,
                risk_details: vec!["Yield curve is inverted: -0.35%".to_string()],
            }),
            recession_history: Fetched::Data(Vec::new()),
            recent_releases: Fetched::failed("FRED API error: 500"),
            important_reports: Fetched::Data(vec![ReportSummary {
                name: "Employment Situation".to_string(),
                source: "bls".to_string(),
                link: "https://www.bls.gov/news.release/empsit.nr0.htm".to_string(),
                analysis: "Payrolls rose more than expected.".to_string(),
            }]),
        }
    }

    #[test]
    fn test_prompt_sections() {
        let prompt = build_prompt(&context(), "");
        assert!(prompt.starts_with("Please analyze the following macroeconomic data"));
        assert!(prompt.contains("Economic Indicators Analysis:\n{"));
        assert!(prompt.contains("\"UNRATE\""));
        assert!(prompt.contains("\"error\": \"No data available for GDP: fewer than two observations\""));
        assert!(prompt.contains("\"risk_level\": \"Moderate\""));
        assert!(prompt.contains("Recent Economic Reports:\n{\n  \"error\": \"FRED API error: 500\"\n}"));
        assert!(prompt.contains("--- Report 1: Employment Situation (BLS) ---\nPayrolls rose more than expected."));
        assert!(prompt.ends_with("it is: Provide a general macroeconomic overview"));
    }

    #[test]
    fn test_prompt_uses_task() {
        let prompt = build_prompt(&context(), "Focus on inflation");
        assert!(prompt.ends_with("it is: Focus on inflation"));
    }

    #[test]
    fn test_failed_reports_omit_analysis_block() {
        let mut context = context();
        context.important_reports = Fetched::failed("FRED API error: 500");
        let prompt = build_prompt(&context, "");
        assert!(!prompt.contains("Analysis of Important Recent Reports"));
    }

    #[test]
    fn test_shorten_summary() {
        assert_eq!(shorten_summary("short"), "short");
        let long = "x".repeat(150);
        let short = shorten_summary(&long);
        assert_eq!(short.chars().count(), 103);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_report_summary_prompt() {
        let prompt = report_summary_prompt("GDP", "bea", "Real GDP increased 1.4 percent");
        assert!(prompt.contains("Report: GDP\nSource: BEA"));
        assert!(prompt.contains("Content Excerpt:\nReal GDP increased 1.4 percent"));
        assert!(prompt.contains("maximum 50 words"));
    }

    #[tokio::test]
    async fn test_analyze_with_scripted_provider() {
        let provider = ScriptedProvider::replying(["Inflation is easing while labor cools.\n<DONE>"]);
        let agent = MacroAgent::new(provider.clone(), &EconomyConfig::default());

        let outcome = agent.analyze(&context(), "Focus on inflation").await;
        assert_eq!(outcome, Outcome::Success("Inflation is easing while labor cools.".to_string()));

        let request = provider.last_request().unwrap();
        assert!(request.system.as_deref().unwrap().contains("Macroeconomic Analysis Agent"));
        assert!(request.last_user_text().unwrap().contains("Focus on inflation"));
    }

    #[tokio::test]
    async fn test_missing_key_is_reported_inline() {
        let provider = ScriptedProvider::replying(Vec::<String>::new());
        let agent = MacroAgent::new(provider, &EconomyConfig::default());

        let context = agent.collect().await;
        assert!(context.indicators.error().unwrap().contains("FRED_API_KEY is not configured"));
        assert!(context.recession_risk.is_failed());
        assert!(context.important_reports.is_failed());
    }

    #[tokio::test]
    async fn test_report_summaries_skip_unlinked_releases() {
        let provider = ScriptedProvider::replying(["unused"]);
        let agent = MacroAgent::new(provider.clone(), &EconomyConfig::default());

        let groups = vec![SourceReleases {
            source: "bls".to_string(),
            releases: vec![
                Release {
                    id: 50,
                    name: "Consumer Price Index".to_string(),
                    press_release: true,
                    link: None,
                    realtime_start: None,
                },
                Release {
                    id: 53,
                    name: "Gross Domestic Product".to_string(),
                    press_release: true,
                    link: Some(String::new()),
                    realtime_start: None,
                },
            ],
        }];

        // Neither release carries a usable link
        assert!(agent.summarize_important_reports(&groups).await.is_empty());
        assert_eq!(provider.calls(), 0);
    }
}
