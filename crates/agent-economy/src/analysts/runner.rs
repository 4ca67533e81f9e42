//! Single-prompt completion loop shared by the analysts
//!
//! A [`PromptRunner`] sends one composed prompt to the text-generation
//! service and turns whatever comes back into an [`Outcome`]:
//!
//! 1. Call the provider with the analyst's system prompt and stop token
//! 2. Normalize the reply through [`TextResponse`]
//! 3. Loop (up to `max_loops`) while the reply was cut off before the stop token
//! 4. Strip the stop token; empty text becomes the fallback message

use crate::config::EconomyConfig;
use crate::debug_log::DebugLog;
use crate::swarm::analysis_fallback;
use agent_core::Outcome;
use agent_llm::{CompletionRequest, LLMProvider, Message, StopReason, strip_stop_token};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

const CONTINUE_PROMPT: &str = "Continue.";

/// Sends prompts on behalf of one analyst
pub struct PromptRunner {
    provider: Arc<dyn LLMProvider>,
    agent_name: String,
    system_prompt: String,
    model: String,
    stop_token: String,
    max_loops: usize,
    max_tokens: usize,
    temperature: Option<f32>,
    fallback: String,
    failure_prefix: String,
    debug_log: Option<DebugLog>,
}

impl PromptRunner {
    /// Create a runner with the analyst's default fallback message
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        config: &EconomyConfig,
        agent_name: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        let agent_name = agent_name.into();
        Self {
            provider,
            fallback: analysis_fallback(&agent_name),
            failure_prefix: format!("Error running {agent_name}"),
            agent_name,
            system_prompt: system_prompt.into(),
            model: config.model.clone(),
            stop_token: config.stop_token.clone(),
            max_loops: config.max_loops.max(1),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            debug_log: config.debug_log(),
        }
    }

    /// Replace the message used when the model produces nothing
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Prefix for `Failed` outcomes, e.g. `"Error analyzing macroeconomic data"`
    pub fn with_failure_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.failure_prefix = prefix.into();
        self
    }

    pub fn with_debug_log(mut self, log: Option<DebugLog>) -> Self {
        self.debug_log = log;
        self
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Readable failure outcome carrying the analyst's error prefix
    pub fn fail(&self, err: impl Display) -> Outcome {
        Outcome::Failed(format!("{}: {err}", self.failure_prefix))
    }

    /// Run a prompt and classify the result
    pub async fn complete(&self, prompt: &str) -> Outcome {
        info!(agent = %self.agent_name, prompt_chars = prompt.chars().count(), "running analysis");

        let outcome = match self.generate(prompt).await {
            Ok(text) if text.is_empty() => {
                warn!(agent = %self.agent_name, "model reply had no usable text");
                Outcome::Degraded(self.fallback.clone())
            }
            Ok(text) => Outcome::Success(text),
            Err(e) => {
                warn!(agent = %self.agent_name, error = %e, "text generation failed");
                self.fail(e)
            }
        };

        if let Some(log) = &self.debug_log {
            log.record(&self.agent_name, prompt, outcome.text()).await;
        }
        outcome
    }

    /// Normalized reply text with the stop token removed, possibly empty
    pub async fn generate(&self, prompt: &str) -> agent_llm::Result<String> {
        let mut conversation = vec![Message::user(prompt)];
        let mut collected = String::new();

        for round in 1..=self.max_loops {
            let mut builder = CompletionRequest::builder(&self.model)
                .messages(conversation.clone())
                .system(self.system_prompt.clone())
                .max_tokens(self.max_tokens);
            if let Some(temperature) = self.temperature {
                builder = builder.temperature(temperature);
            }
            if !self.stop_token.is_empty() {
                builder = builder.stop_sequences(vec![self.stop_token.clone()]);
            }

            let response = self.provider.complete(builder.build()).await?;
            let text = response.text_response().normalize();
            debug!(
                agent = %self.agent_name,
                round,
                stop_reason = ?response.stop_reason,
                chars = text.chars().count(),
                "completion round finished"
            );

            let finished = response.stop_reason != StopReason::MaxTokens
                || (!self.stop_token.is_empty() && text.contains(&self.stop_token));
            if !collected.is_empty() && !text.is_empty() {
                collected.push('\n');
            }
            collected.push_str(&text);

            if finished {
                break;
            }
            conversation.push(Message::assistant(text));
            conversation.push(Message::user(CONTINUE_PROMPT));
        }

        Ok(strip_stop_token(&collected, &self.stop_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysts::test_support::ScriptedProvider;
    use agent_llm::{CompletionResponse, LLMError};

    fn runner(provider: Arc<ScriptedProvider>, config: &EconomyConfig) -> PromptRunner {
        PromptRunner::new(provider, config, "MacroAgent", "You are a test analyst.")
            .with_failure_prefix("Error analyzing macroeconomic data")
    }

    #[tokio::test]
    async fn test_plain_reply_strips_stop_token() {
        let provider = ScriptedProvider::replying(["Growth is slowing.\n<DONE>"]);
        let outcome = runner(provider.clone(), &EconomyConfig::default()).complete("prompt").await;

        assert_eq!(outcome, Outcome::Success("Growth is slowing.".to_string()));
        let request = provider.last_request().unwrap();
        assert_eq!(request.system.as_deref(), Some("You are a test analyst."));
        assert_eq!(request.stop_sequences, Some(vec!["<DONE>".to_string()]));
        assert_eq!(request.last_user_text(), Some("prompt"));
    }

    #[tokio::test]
    async fn test_structured_reply_is_normalized() {
        let provider = ScriptedProvider::replying([r#"{"output": "Yields rose.", "meta": 1}"#]);
        let outcome = runner(provider, &EconomyConfig::default()).complete("prompt").await;
        assert_eq!(outcome.text(), "Yields rose.");
    }

    #[tokio::test]
    async fn test_empty_reply_degrades_to_fallback() {
        let provider = ScriptedProvider::replying(["<DONE>"]);
        let outcome = runner(provider, &EconomyConfig::default()).complete("prompt").await;
        assert_eq!(
            outcome,
            Outcome::Degraded(
                "The MacroAgent was unable to generate a proper analysis. Please check the logs for details."
                    .to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_unrecognized_shape_degrades() {
        let provider = ScriptedProvider::replying([r#"{"note": "short"}"#]);
        let outcome = runner(provider, &EconomyConfig::default()).complete("prompt").await;
        assert!(matches!(outcome, Outcome::Degraded(_)));
    }

    #[tokio::test]
    async fn test_provider_error_uses_prefix() {
        let provider = ScriptedProvider::failing(LLMError::RateLimitExceeded("slow down".to_string()));
        let outcome = runner(provider, &EconomyConfig::default()).complete("prompt").await;
        assert_eq!(
            outcome,
            Outcome::Failed("Error analyzing macroeconomic data: Rate limit exceeded: slow down".to_string())
        );
    }

    #[tokio::test]
    async fn test_single_loop_by_default() {
        let provider = ScriptedProvider::with_responses(vec![
            Ok(CompletionResponse {
                stop_reason: StopReason::MaxTokens,
                ..CompletionResponse::from_text("partial")
            }),
            Ok(CompletionResponse::from_text("rest <DONE>")),
        ]);
        let outcome = runner(provider.clone(), &EconomyConfig::default()).complete("prompt").await;
        assert_eq!(outcome.text(), "partial");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_continues_when_cut_off() {
        let provider = ScriptedProvider::with_responses(vec![
            Ok(CompletionResponse {
                stop_reason: StopReason::MaxTokens,
                ..CompletionResponse::from_text("part one")
            }),
            Ok(CompletionResponse::from_text("part two <DONE>")),
        ]);
        let config = EconomyConfig::builder().max_loops(3).build().unwrap();
        let outcome = runner(provider.clone(), &config).complete("prompt").await;

        assert_eq!(outcome.text(), "part one\npart two");
        assert_eq!(provider.calls(), 2);
        assert_eq!(provider.last_request().unwrap().last_user_text(), Some("Continue."));
    }

    #[tokio::test]
    async fn test_debug_record_written() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ScriptedProvider::replying(["text"]);
        let outcome = runner(provider, &EconomyConfig::default())
            .with_debug_log(Some(DebugLog::new(dir.path())))
            .complete("prompt")
            .await;

        assert!(outcome.is_success());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_custom_fallback() {
        let provider = ScriptedProvider::replying([""]);
        let runner = runner(provider, &EconomyConfig::default()).with_fallback("nothing came back");
        let outcome = tokio_test::block_on(runner.complete("prompt"));
        assert_eq!(outcome, Outcome::Degraded("nothing came back".to_string()));
    }
}
