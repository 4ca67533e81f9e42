//! Command-line interface for the economic summary swarm

use agent_core::Agent;
use agent_economy::analysts::{self, AggregatorAgent, DOMAINS};
use agent_economy::{AggregationResult, EconomicSummarySwarm, EconomyConfig, EconomyError};
use agent_llm::LLMProvider;
use agent_llm::providers::OpenAIProvider;
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "economic-summary")]
#[command(about = "Summarize current economic conditions across domains", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// How the domain analysts are run
    #[arg(long, value_enum, default_value_t = Mode::Sequential)]
    mode: Mode,

    /// Task for the summary; each analyst falls back to its own default
    #[arg(long, global = true)]
    task: Option<String>,

    /// Comma-separated domains to include
    #[arg(long, value_delimiter = ',', default_values_t = DOMAINS.map(String::from))]
    domains: Vec<String>,

    /// Print the full report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write a debug record for every prompt and reply
    #[arg(long, global = true)]
    save: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single domain analyst
    Analyst {
        /// One of: macro, equities, fixed_income, commodities, political
        domain: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// One domain after another
    Sequential,
    /// Concurrent first pass, peer refinement, then synthesis
    Mixture,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    agent_utils::init_tracing_with(default_log_level(cli.verbose), cli.json_logs);

    if let Err(e) = run(cli).await {
        error!(error = %e, "economic summary failed");
        println!("Error: {e:#}");
    }
    Ok(())
}

fn default_log_level(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let provider = openai_provider(&config)?;
    let task = cli.task.clone().unwrap_or_default();

    match &cli.command {
        Some(Command::Analyst { domain }) => {
            let analyst = analysts::analyst_for(domain, provider, &config)?;
            info!(domain = %domain, analyst = analyst.name(), "running single analyst");
            let outcome = analyst.run(&task).await?;
            println!("{}", outcome.text());
        }
        None => {
            let swarm = build_swarm(provider, &config, &cli.domains)?;
            info!(mode = ?cli.mode, domains = ?swarm.domains(), "running economic summary");
            let report = match cli.mode {
                Mode::Sequential => swarm.run_sequential_report(&task).await,
                Mode::Mixture => swarm.run_with_mixture_report(&task).await,
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<EconomyConfig> {
    let mut builder = EconomyConfig::builder();
    if cli.save {
        builder = builder.auto_save(true);
    }
    if cli.verbose {
        builder = builder.verbose(true);
    }
    builder
        .with_env()
        .build()
        .context("invalid configuration")
}

fn openai_provider(config: &EconomyConfig) -> anyhow::Result<Arc<dyn LLMProvider>> {
    let api_key = config
        .openai_api_key
        .clone()
        .ok_or(EconomyError::MissingCredential("OPENAI_API_KEY"))?;
    Ok(Arc::new(OpenAIProvider::new(api_key)?))
}

fn build_swarm(
    provider: Arc<dyn LLMProvider>,
    config: &EconomyConfig,
    domains: &[String],
) -> anyhow::Result<EconomicSummarySwarm> {
    let aggregator = Arc::new(AggregatorAgent::new(Arc::clone(&provider), config));
    let mut swarm = EconomicSummarySwarm::new(aggregator).with_policy(config.truncation.clone());
    if let Some(timeout) = config.call_timeout {
        swarm = swarm.with_call_timeout(timeout);
    }

    for domain in domains.iter().map(|d| d.trim()).filter(|d| !d.is_empty()) {
        swarm.register(domain, analysts::analyst_for(domain, Arc::clone(&provider), config)?);
    }
    Ok(swarm)
}

fn status_table(report: &AggregationResult) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Domain", "Status", "Characters"]);

    for insight in &report.request.insights {
        table.add_row(vec![
            insight.domain.clone(),
            insight.status.as_str().to_string(),
            insight.text.chars().count().to_string(),
        ]);
    }
    table.add_row(vec![
        "summary".to_string(),
        report.status.as_str().to_string(),
        report.final_text.chars().count().to_string(),
    ]);
    table
}

fn print_report(report: &AggregationResult) {
    println!("{}\n", status_table(report));
    if report.refined {
        println!("Domain insights were refined against peer analyses.\n");
    }
    println!("{}", report.final_text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_economy::{AggregationRequest, DomainInsight, InsightStatus};

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["economic-summary"]).unwrap();
        assert_eq!(cli.mode, Mode::Sequential);
        assert_eq!(cli.domains, DOMAINS.map(String::from).to_vec());
        assert!(cli.command.is_none());
        assert!(!cli.save);
    }

    #[test]
    fn test_mixture_with_domains() {
        let cli = Cli::try_parse_from([
            "economic-summary",
            "--mode",
            "mixture",
            "--domains",
            "macro,fixed_income",
            "--task",
            "Focus on inflation",
            "--save",
        ])
        .unwrap();
        assert_eq!(cli.mode, Mode::Mixture);
        assert_eq!(cli.domains, vec!["macro", "fixed_income"]);
        assert_eq!(cli.task.as_deref(), Some("Focus on inflation"));
        assert!(cli.save);
    }

    #[test]
    fn test_analyst_subcommand() {
        let cli = Cli::try_parse_from(["economic-summary", "analyst", "political", "--task", "Tariffs"])
            .unwrap();
        match cli.command {
            Some(Command::Analyst { domain }) => assert_eq!(domain, "political"),
            None => panic!("expected analyst subcommand"),
        }
        assert_eq!(cli.task.as_deref(), Some("Tariffs"));
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(default_log_level(false), "info");
        assert_eq!(default_log_level(true), "debug");
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(Cli::try_parse_from(["economic-summary", "--mode", "parallel"]).is_err());
    }

    #[test]
    fn test_status_table_lists_domains_and_summary() {
        let report = AggregationResult {
            request: AggregationRequest::new(
                "",
                vec![
                    DomainInsight::new("macro", "Growth slowing", InsightStatus::Ok),
                    DomainInsight::new("equities", "Error: timed out", InsightStatus::Error),
                ],
            ),
            final_text: "Summary".to_string(),
            status: InsightStatus::Ok,
            refined: false,
        };

        let rendered = status_table(&report).to_string();
        assert!(rendered.contains("macro"));
        assert!(rendered.contains("error"));
        assert!(rendered.contains("summary"));
    }
}
