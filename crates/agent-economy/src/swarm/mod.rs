//! Orchestrates the domain analysts and the final synthesis
//!
//! The swarm owns an ordered list of `domain -> analyst` registrations and an
//! aggregator. Two strategies are offered:
//!
//! - **Sequential**: every domain runs in registration order, then the
//!   aggregator synthesizes the combined insights.
//! - **Mixture**: every domain runs concurrently, each analyst then refines its
//!   first pass against a condensed view of its peers, and the aggregator
//!   synthesizes the refined insights.
//!
//! Neither strategy returns an error: analyst failures become inline
//! `"Error: <message>"` insights and a failed synthesis becomes the returned
//! text.

mod format;
mod insight;

pub use format::{
    DEFAULT_TRUNCATION_MARKER, INSIGHTS_FOOTER, INSIGHTS_HEADER, TruncationPolicy, domain_section,
    insights_block, peer_context,
};
pub use insight::{
    AggregationRequest, AggregationResult, DomainInsight, InsightStatus, analysis_fallback,
    summary_fallback,
};

use agent_core::{Agent, Error, Outcome};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Task used when the caller does not provide one
pub const DEFAULT_TASK: &str =
    "Provide a comprehensive summary of current economic conditions across all domains";

/// Returned when a run is requested before any domain is registered
pub const NO_DOMAINS_MESSAGE: &str = "Error: No domain agents registered. Add domain agents first.";

/// Domain analysts plus the aggregator that combines them
pub struct EconomicSummarySwarm {
    aggregator: Arc<dyn Agent>,
    domains: Vec<(String, Arc<dyn Agent>)>,
    policy: TruncationPolicy,
    call_timeout: Option<Duration>,
}

impl EconomicSummarySwarm {
    pub fn new(aggregator: Arc<dyn Agent>) -> Self {
        Self {
            aggregator,
            domains: Vec::new(),
            policy: TruncationPolicy::default(),
            call_timeout: None,
        }
    }

    /// Register an analyst for a domain
    ///
    /// Re-registering a domain replaces its analyst and keeps its position.
    pub fn register(&mut self, domain: impl Into<String>, analyst: Arc<dyn Agent>) -> &mut Self {
        let domain = domain.into();
        match self.domains.iter_mut().find(|(name, _)| *name == domain) {
            Some(slot) => {
                debug!(domain = %domain, analyst = analyst.name(), "replacing domain analyst");
                slot.1 = analyst;
            }
            None => {
                debug!(domain = %domain, analyst = analyst.name(), "registering domain analyst");
                self.domains.push((domain, analyst));
            }
        }
        self
    }

    /// Registered domains in registration order
    pub fn domains(&self) -> Vec<&str> {
        self.domains.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Replace the truncation policy; an invalid policy is ignored
    pub fn with_policy(mut self, policy: TruncationPolicy) -> Self {
        match policy.validate() {
            Ok(()) => self.policy = policy,
            Err(e) => warn!(error = %e, "ignoring invalid truncation policy"),
        }
        self
    }

    /// Bound every analyst and aggregator call
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn policy(&self) -> &TruncationPolicy {
        &self.policy
    }

    /// Run every domain in order, then synthesize
    pub async fn run_sequential(&self, task: &str) -> String {
        self.run_sequential_report(task).await.final_text
    }

    /// Run every domain concurrently, refine against peers, then synthesize
    pub async fn run_with_mixture(&self, task: &str) -> String {
        self.run_with_mixture_report(task).await.final_text
    }

    pub async fn run_sequential_report(&self, task: &str) -> AggregationResult {
        let task = task_or_default(task);
        if let Some(empty) = self.empty_result(task) {
            return empty;
        }

        let started = Instant::now();
        info!(domains = self.domains.len(), "running domains sequentially");

        let mut insights = Vec::with_capacity(self.domains.len());
        for (domain, analyst) in &self.domains {
            insights.push(self.first_pass(domain, analyst.as_ref(), task).await);
        }

        let request = AggregationRequest::new(task, insights);
        let result = self.synthesize(request, false).await;
        info!(
            status = result.status.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sequential summary finished"
        );
        result
    }

    pub async fn run_with_mixture_report(&self, task: &str) -> AggregationResult {
        let task = task_or_default(task);
        if let Some(empty) = self.empty_result(task) {
            return empty;
        }

        let started = Instant::now();
        info!(domains = self.domains.len(), "running domains concurrently");

        // join_all yields results in input order, i.e. registration order
        let first_pass = join_all(
            self.domains
                .iter()
                .map(|(domain, analyst)| self.first_pass(domain, analyst.as_ref(), task)),
        )
        .await;

        let refined = join_all(self.domains.iter().zip(&first_pass).map(|((domain, analyst), own)| {
            self.refine(domain, analyst.as_ref(), task, own, &first_pass)
        }))
        .await;

        let request = AggregationRequest::new(task, refined);
        let result = self.synthesize(request, true).await;
        info!(
            status = result.status.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "mixture summary finished"
        );
        result
    }

    fn empty_result(&self, task: &str) -> Option<AggregationResult> {
        if !self.domains.is_empty() {
            return None;
        }
        warn!("summary requested with no domain agents registered");
        Some(AggregationResult {
            request: AggregationRequest::new(task, Vec::new()),
            final_text: NO_DOMAINS_MESSAGE.to_string(),
            status: InsightStatus::Error,
            refined: false,
        })
    }

    async fn first_pass(&self, domain: &str, analyst: &dyn Agent, task: &str) -> DomainInsight {
        let domain_task = domain_task(domain, task);
        let started = Instant::now();
        let result = self.call(analyst, &domain_task).await;
        let insight = DomainInsight::from_result(domain, analyst.name(), result);

        match insight.status {
            InsightStatus::Ok => info!(
                domain,
                chars = insight.text.chars().count(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "domain analysis complete"
            ),
            _ => warn!(domain, status = insight.status.as_str(), text = %insight.text, "domain analysis not usable"),
        }

        insight
    }

    /// Second pass with peer context; falls back to the first pass on any failure
    async fn refine(
        &self,
        domain: &str,
        analyst: &dyn Agent,
        task: &str,
        own: &DomainInsight,
        all: &[DomainInsight],
    ) -> DomainInsight {
        let prompt = refinement_task(domain, task, own, all, &self.policy);
        let result = self.call(analyst, &prompt).await;
        let refined = DomainInsight::from_result(domain, analyst.name(), result);

        if refined.is_usable() {
            debug!(domain, chars = refined.text.chars().count(), "refinement complete");
            refined
        } else {
            warn!(domain, reason = %refined.text, "refinement failed, keeping first pass");
            own.clone()
        }
    }

    async fn synthesize(&self, request: AggregationRequest, refined: bool) -> AggregationResult {
        let prompt = synthesis_task(&request, &self.policy);
        let name = self.aggregator.name().to_string();

        let (final_text, status) = match self.call(self.aggregator.as_ref(), &prompt).await {
            Ok(outcome) => {
                let status = InsightStatus::from(&outcome);
                let text = outcome.into_text();
                if text.trim().is_empty() {
                    (summary_fallback(&name), InsightStatus::Degraded)
                } else {
                    (text, status)
                }
            }
            Err(e) => {
                warn!(error = %e, "synthesis failed");
                (format!("Error generating economic summary: {e}"), InsightStatus::Error)
            }
        };

        AggregationResult {
            request,
            final_text,
            status,
            refined,
        }
    }

    async fn call(&self, agent: &dyn Agent, task: &str) -> agent_core::Result<Outcome> {
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, agent.run(task))
                .await
                .unwrap_or_else(|_| {
                    Err(Error::Timeout {
                        agent: agent.name().to_string(),
                        limit,
                    })
                }),
            None => agent.run(task).await,
        }
    }
}

/// `task`, or [`DEFAULT_TASK`] when it is blank
pub fn task_or_default(task: &str) -> &str {
    if task.trim().is_empty() { DEFAULT_TASK } else { task }
}

/// Task handed to a domain analyst on the first pass
pub fn domain_task(domain: &str, task: &str) -> String {
    format!("Provide {domain} analysis for: {task}")
}

/// Task handed to a domain analyst on the refinement pass
pub fn refinement_task(
    domain: &str,
    task: &str,
    own: &DomainInsight,
    all: &[DomainInsight],
    policy: &TruncationPolicy,
) -> String {
    let peers = peer_context(all, domain, policy);
    let peers = if peers.is_empty() {
        "(no other domains reported)".to_string()
    } else {
        peers
    };

    format!(
        "Refine your {domain} analysis for: {task}\n\n\
         Your first-pass analysis:\n{own}\n\n\
         Condensed first-pass analyses from the other domains:\n\n{peers}\n\n\
         Revise your analysis in light of these cross-domain insights. Note where other \
         domains confirm or contradict your findings and adjust the implications accordingly.",
        own = policy.truncate(&own.text),
    )
}

/// Task handed to the aggregator
pub fn synthesis_task(request: &AggregationRequest, policy: &TruncationPolicy) -> String {
    format!("{}\n\n{}", request.task, insights_block(&request.insights, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysts::AggregatorAgent;
    use crate::analysts::test_support::ScriptedProvider;
    use async_trait::async_trait;
    use mockall::mock;
    use std::sync::Mutex;

    mock! {
        pub Analyst {}

        #[async_trait]
        impl Agent for Analyst {
            async fn run(&self, task: &str) -> agent_core::Result<Outcome>;
            fn name(&self) -> &str;
        }
    }

    fn analyst<F>(name: &'static str, respond: F) -> Arc<dyn Agent>
    where
        F: Fn(&str) -> agent_core::Result<Outcome> + Send + 'static,
    {
        let mut mock = MockAnalyst::new();
        mock.expect_name().return_const(name.to_string());
        mock.expect_run().returning(move |task| respond(task));
        Arc::new(mock)
    }

    /// Aggregator that records the prompts it receives
    struct CapturingAggregator {
        prompts: Mutex<Vec<String>>,
        reply: agent_core::Result<Outcome>,
    }

    impl CapturingAggregator {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                reply: Ok(Outcome::Success(text.to_string())),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                reply: Err(Error::ProcessingFailed(message.to_string())),
            })
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl Agent for CapturingAggregator {
        async fn run(&self, task: &str) -> agent_core::Result<Outcome> {
            self.prompts.lock().unwrap().push(task.to_string());
            match &self.reply {
                Ok(outcome) => Ok(outcome.clone()),
                Err(e) => Err(Error::ProcessingFailed(e.to_string())),
            }
        }

        fn name(&self) -> &str {
            "AggregatorAgent"
        }
    }

    fn abc_swarm(aggregator: Arc<CapturingAggregator>) -> EconomicSummarySwarm {
        let mut swarm = EconomicSummarySwarm::new(aggregator);
        swarm
            .register("A", analyst("AgentA", |_| Ok(Outcome::Success("OK-A".to_string()))))
            .register(
                "B",
                analyst("AgentB", |_| Err(Error::ProcessingFailed("collector exploded".to_string()))),
            )
            .register("C", analyst("AgentC", |_| Ok(Outcome::Success(String::new()))));
        swarm
    }

    #[tokio::test]
    async fn test_sequential_mixed_outcomes() {
        let aggregator = CapturingAggregator::replying("FINAL");
        let swarm = abc_swarm(aggregator.clone());

        let result = swarm.run_sequential_report("Summarize the economy").await;
        assert_eq!(result.final_text, "FINAL");
        assert!(!result.refined);

        let texts = result.request.texts();
        assert_eq!(
            texts,
            vec![
                ("A", "OK-A"),
                ("B", "Error: collector exploded"),
                (
                    "C",
                    "The AgentC was unable to generate a proper analysis. Please check the logs for details."
                ),
            ]
        );

        let prompt = aggregator.last_prompt();
        assert!(prompt.starts_with("Summarize the economy"));
        assert!(prompt.contains("=== DOMAIN INSIGHTS ==="));
        assert!(prompt.contains("A DOMAIN SUMMARY:\nOK-A"));
        assert!(prompt.contains("B DOMAIN SUMMARY:\nError: collector exploded"));
        assert!(prompt.contains("C DOMAIN SUMMARY:\nThe AgentC was unable"));
        assert!(prompt.ends_with("=== END DOMAIN INSIGHTS ==="));
    }

    #[tokio::test]
    async fn test_domain_task_wording() {
        let aggregator = CapturingAggregator::replying("FINAL");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let mut swarm = EconomicSummarySwarm::new(aggregator);
        swarm.register(
            "macro",
            analyst("MacroAgent", move |task| {
                seen_clone.lock().unwrap().push(task.to_string());
                Ok(Outcome::Success("growth".to_string()))
            }),
        );
        swarm.run_sequential("Outlook for Q3").await;

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["Provide macro analysis for: Outlook for Q3".to_string()]
        );
    }

    #[tokio::test]
    async fn test_sequential_is_idempotent() {
        let aggregator = CapturingAggregator::replying("FINAL");
        let swarm = abc_swarm(aggregator.clone());

        let first = swarm.run_sequential("task").await;
        let first_prompt = aggregator.last_prompt();
        let second = swarm.run_sequential("task").await;
        assert_eq!(first, second);
        assert_eq!(first_prompt, aggregator.last_prompt());
    }

    #[tokio::test]
    async fn test_registration_order_changes_sequence_not_membership() {
        let forward = CapturingAggregator::replying("FINAL");
        let mut swarm = EconomicSummarySwarm::new(forward.clone());
        swarm
            .register("macro", analyst("MacroAgent", |_| Ok(Outcome::Success("m".to_string()))))
            .register("equities", analyst("EquitiesAgent", |_| Ok(Outcome::Success("e".to_string()))));
        swarm.run_sequential("task").await;

        let reversed = CapturingAggregator::replying("FINAL");
        let mut swarm = EconomicSummarySwarm::new(reversed.clone());
        swarm
            .register("equities", analyst("EquitiesAgent", |_| Ok(Outcome::Success("e".to_string()))))
            .register("macro", analyst("MacroAgent", |_| Ok(Outcome::Success("m".to_string()))));
        swarm.run_sequential("task").await;

        let a = forward.last_prompt();
        let b = reversed.last_prompt();
        for section in ["MACRO DOMAIN SUMMARY:\nm", "EQUITIES DOMAIN SUMMARY:\ne"] {
            assert!(a.contains(section));
            assert!(b.contains(section));
        }
        assert!(a.find("MACRO").unwrap() < a.find("EQUITIES").unwrap());
        assert!(b.find("EQUITIES").unwrap() < b.find("MACRO").unwrap());
    }

    #[tokio::test]
    async fn test_register_replaces_in_place() {
        let aggregator = CapturingAggregator::replying("FINAL");
        let mut swarm = EconomicSummarySwarm::new(aggregator.clone());
        swarm
            .register("macro", analyst("Old", |_| Ok(Outcome::Success("old".to_string()))))
            .register("equities", analyst("EquitiesAgent", |_| Ok(Outcome::Success("e".to_string()))))
            .register("macro", analyst("New", |_| Ok(Outcome::Success("new".to_string()))));

        assert_eq!(swarm.domains(), vec!["macro", "equities"]);
        swarm.run_sequential("task").await;
        assert!(aggregator.last_prompt().contains("MACRO DOMAIN SUMMARY:\nnew"));
    }

    #[tokio::test]
    async fn test_no_domains() {
        let swarm = EconomicSummarySwarm::new(CapturingAggregator::replying("FINAL"));
        assert_eq!(swarm.run_sequential("task").await, NO_DOMAINS_MESSAGE);
        assert_eq!(swarm.run_with_mixture("task").await, NO_DOMAINS_MESSAGE);
    }

    #[tokio::test]
    async fn test_synthesis_failure_becomes_text() {
        let swarm = abc_swarm(CapturingAggregator::failing("rate limited"));
        let result = swarm.run_sequential_report("task").await;
        assert_eq!(result.final_text, "Error generating economic summary: rate limited");
        assert_eq!(result.status, InsightStatus::Error);
    }

    #[tokio::test]
    async fn test_empty_synthesis_gets_fallback() {
        let swarm = abc_swarm(CapturingAggregator::replying(""));
        assert_eq!(
            swarm.run_sequential("task").await,
            "The AggregatorAgent was unable to generate a proper summary. Please check the logs for details."
        );
    }

    #[tokio::test]
    async fn test_long_insight_truncated_in_synthesis() {
        let aggregator = CapturingAggregator::replying("FINAL");
        let long: String = "abcdefghij".repeat(700);
        let expected = TruncationPolicy::default().truncate(&long);
        let long_clone = long.clone();

        let mut swarm = EconomicSummarySwarm::new(aggregator.clone());
        swarm.register(
            "macro",
            analyst("MacroAgent", move |_| Ok(Outcome::Success(long_clone.clone()))),
        );
        swarm.run_sequential("task").await;

        let prompt = aggregator.last_prompt();
        assert!(prompt.contains(&format!("MACRO DOMAIN SUMMARY:\n{expected}\n\n")));
        assert!(!prompt.contains(&long));
    }

    #[tokio::test]
    async fn test_mixture_refines_with_peer_context() {
        let aggregator = CapturingAggregator::replying("FINAL");
        let mut swarm = EconomicSummarySwarm::new(aggregator.clone());

        let refine_prompt = Arc::new(Mutex::new(String::new()));
        let captured = refine_prompt.clone();
        swarm
            .register(
                "macro",
                analyst("MacroAgent", move |task| {
                    if task.starts_with("Refine") {
                        *captured.lock().unwrap() = task.to_string();
                        Ok(Outcome::Success("macro refined".to_string()))
                    } else {
                        Ok(Outcome::Success("macro first".to_string()))
                    }
                }),
            )
            .register(
                "equities",
                analyst("EquitiesAgent", |task| {
                    if task.starts_with("Refine") {
                        Ok(Outcome::Success("equities refined".to_string()))
                    } else {
                        Ok(Outcome::Success("equities first".to_string()))
                    }
                }),
            );

        let result = swarm.run_with_mixture_report("task").await;
        assert!(result.refined);
        assert_eq!(
            result.request.texts(),
            vec![("macro", "macro refined"), ("equities", "equities refined")]
        );

        let prompt = refine_prompt.lock().unwrap().clone();
        assert!(prompt.contains("Your first-pass analysis:\nmacro first"));
        assert!(prompt.contains("EQUITIES DOMAIN SUMMARY:\nequities first"));
        assert!(!prompt.contains("MACRO DOMAIN SUMMARY"));
        assert!(aggregator.last_prompt().contains("MACRO DOMAIN SUMMARY:\nmacro refined"));
    }

    #[tokio::test]
    async fn test_mixture_failed_refinement_keeps_first_pass() {
        let aggregator = CapturingAggregator::replying("FINAL");
        let mut swarm = EconomicSummarySwarm::new(aggregator.clone());
        swarm
            .register(
                "macro",
                analyst("MacroAgent", |task| {
                    if task.starts_with("Refine") {
                        Err(Error::ProcessingFailed("second call failed".to_string()))
                    } else {
                        Ok(Outcome::Success("macro first".to_string()))
                    }
                }),
            )
            .register(
                "equities",
                analyst("EquitiesAgent", |_| Err(Error::ProcessingFailed("down".to_string()))),
            );

        let result = swarm.run_with_mixture_report("task").await;
        assert_eq!(
            result.request.texts(),
            vec![("macro", "macro first"), ("equities", "Error: down")]
        );
        assert_eq!(result.final_text, "FINAL");
    }

    struct SlowAgent;

    #[async_trait]
    impl Agent for SlowAgent {
        async fn run(&self, _task: &str) -> agent_core::Result<Outcome> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Outcome::Success("late".to_string()))
        }

        fn name(&self) -> &str {
            "SlowAgent"
        }
    }

    #[tokio::test]
    async fn test_call_timeout() {
        let aggregator = CapturingAggregator::replying("FINAL");
        let mut swarm = EconomicSummarySwarm::new(aggregator).with_call_timeout(Duration::from_millis(20));
        swarm.register("slow", Arc::new(SlowAgent));

        let result = swarm.run_sequential_report("task").await;
        assert_eq!(
            result.request.get("slow").map(|i| i.text.as_str()),
            Some("Error: Agent 'SlowAgent' timed out after 20ms")
        );
    }

    #[tokio::test]
    async fn test_one_debug_record_per_aggregator_call() {
        let dir = tempfile::tempdir().unwrap();
        let config = crate::config::EconomyConfig::builder()
            .auto_save(true)
            .output_dir(dir.path())
            .build()
            .unwrap();
        let provider = ScriptedProvider::replying(["Summary"]);
        let aggregator = Arc::new(AggregatorAgent::new(provider, &config));

        let mut swarm = EconomicSummarySwarm::new(aggregator);
        swarm.register("macro", analyst("MacroAgent", |_| Ok(Outcome::Success("m".to_string()))));
        assert_eq!(swarm.run_sequential("task").await, "Summary");

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1, "{names:?}");
        assert!(names[0].starts_with("AggregatorAgent_"));

        let raw = std::fs::read_to_string(dir.path().join(&names[0])).unwrap();
        assert!(raw.contains("Please synthesize the following domain-specific economic analyses"));
        assert!(raw.contains("MACRO DOMAIN SUMMARY"));
    }

    #[tokio::test]
    async fn test_invalid_policy_is_ignored() {
        let invalid = TruncationPolicy {
            threshold_chars: 4,
            head_tail_chars: 10,
            condensed_chars: 2,
            marker: "|".to_string(),
        };
        let aggregator = CapturingAggregator::replying("FINAL");
        let mut swarm = EconomicSummarySwarm::new(aggregator.clone()).with_policy(invalid);
        assert_eq!(swarm.policy(), &TruncationPolicy::default());

        swarm.register("macro", analyst("MacroAgent", |_| Ok(Outcome::Success("hello".to_string()))));
        assert_eq!(swarm.run_sequential("task").await, "FINAL");
        assert!(aggregator.last_prompt().contains("MACRO DOMAIN SUMMARY:\nhello\n\n"));
    }

    #[tokio::test]
    async fn test_valid_policy_is_applied() {
        let policy = TruncationPolicy {
            threshold_chars: 100,
            head_tail_chars: 40,
            condensed_chars: 10,
            marker: "|".to_string(),
        };
        let swarm = EconomicSummarySwarm::new(CapturingAggregator::replying("FINAL")).with_policy(policy.clone());
        assert_eq!(swarm.policy(), &policy);
    }

    #[tokio::test]
    async fn test_blank_task_uses_default() {
        let aggregator = CapturingAggregator::replying("FINAL");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let mut swarm = EconomicSummarySwarm::new(aggregator.clone());
        swarm.register(
            "macro",
            analyst("MacroAgent", move |task| {
                seen_clone.lock().unwrap().push(task.to_string());
                Ok(Outcome::Success("growth".to_string()))
            }),
        );

        let result = swarm.run_sequential_report("  ").await;
        assert_eq!(result.request.task, DEFAULT_TASK);
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            [format!("Provide macro analysis for: {DEFAULT_TASK}")]
        );
        assert!(aggregator.last_prompt().starts_with(DEFAULT_TASK));

        swarm.run_with_mixture("").await;
        assert!(aggregator.last_prompt().starts_with(DEFAULT_TASK));
        assert_eq!(task_or_default("Outlook for Q3"), "Outlook for Q3");
    }

    #[tokio::test]
    async fn test_mixture_failed_first_pass_recovers_on_refinement() {
        let aggregator = CapturingAggregator::replying("FINAL");
        let macro_refine_prompt = Arc::new(Mutex::new(String::new()));
        let equities_refine_prompt = Arc::new(Mutex::new(String::new()));
        let (macro_seen, equities_seen) = (macro_refine_prompt.clone(), equities_refine_prompt.clone());

        let mut swarm = EconomicSummarySwarm::new(aggregator.clone());
        swarm
            .register(
                "macro",
                analyst("MacroAgent", move |task| {
                    if task.starts_with("Refine") {
                        *macro_seen.lock().unwrap() = task.to_string();
                        Ok(Outcome::Success("macro refined".to_string()))
                    } else {
                        Ok(Outcome::Success("macro first".to_string()))
                    }
                }),
            )
            .register(
                "equities",
                analyst("EquitiesAgent", move |task| {
                    if task.starts_with("Refine") {
                        *equities_seen.lock().unwrap() = task.to_string();
                        Ok(Outcome::Success("equities refined".to_string()))
                    } else {
                        Err(Error::ProcessingFailed("quote feed down".to_string()))
                    }
                }),
            );

        let result = swarm.run_with_mixture_report("task").await;
        assert_eq!(
            result.request.texts(),
            vec![("macro", "macro refined"), ("equities", "equities refined")]
        );
        assert!(result.request.insights.iter().all(|i| i.status == InsightStatus::Ok));

        // the failed first pass is still what the peers and the analyst itself see
        assert!(macro_refine_prompt
            .lock()
            .unwrap()
            .contains("EQUITIES DOMAIN SUMMARY:\nError: quote feed down"));
        assert!(equities_refine_prompt
            .lock()
            .unwrap()
            .contains("Your first-pass analysis:\nError: quote feed down"));

        let prompt = aggregator.last_prompt();
        assert!(prompt.contains("EQUITIES DOMAIN SUMMARY:\nequities refined"));
        assert!(!prompt.contains("quote feed down"));
    }
}
