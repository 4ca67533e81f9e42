//! Configuration for economic data collection and analysis

use crate::debug_log::DebugLog;
use crate::error::{EconomyError, Result};
use crate::swarm::TruncationPolicy;
use agent_utils::{env_flag, env_parse, env_var};
use std::path::PathBuf;
use std::time::Duration;

/// Default model for every analyst
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Marker the analysts are asked to end their replies with
pub const DEFAULT_STOP_TOKEN: &str = "<DONE>";

const DEFAULT_SEC_USER_AGENT: &str = "agent-economy (agent-economy@example.com)";

/// Configuration shared by collectors, analysts and the swarm
#[derive(Debug, Clone)]
pub struct EconomyConfig {
    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// FRED API key (macro indicators and releases)
    pub fred_api_key: Option<String>,

    /// NewsAPI key (equities, commodities and political news)
    pub news_api_key: Option<String>,

    /// Finnhub API key (earnings calendar)
    pub finnhub_api_key: Option<String>,

    /// User-Agent sent to SEC EDGAR, which requires a contact address
    pub sec_user_agent: String,

    /// Model identifier passed to the text-generation service
    pub model: String,

    /// Stop token appended by the analysts
    pub stop_token: String,

    /// Maximum completion rounds per analyst call
    pub max_loops: usize,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// HTTP timeout for data collectors
    pub request_timeout: Duration,

    /// Optional wall-clock budget for a single analyst run inside the swarm
    pub call_timeout: Option<Duration>,

    /// Verbose logging
    pub verbose: bool,

    /// Write one JSON debug record per analyst call
    pub auto_save: bool,

    /// Directory for debug records
    pub output_dir: PathBuf,

    /// Length caps applied to domain insights
    pub truncation: TruncationPolicy,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            fred_api_key: None,
            news_api_key: None,
            finnhub_api_key: None,
            sec_user_agent: DEFAULT_SEC_USER_AGENT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            stop_token: DEFAULT_STOP_TOKEN.to_string(),
            max_loops: 1,
            max_tokens: 4096,
            temperature: None,
            request_timeout: Duration::from_secs(30),
            call_timeout: None,
            verbose: false,
            auto_save: false,
            output_dir: PathBuf::from("outputs"),
            truncation: TruncationPolicy::default(),
        }
    }
}

impl EconomyConfig {
    /// Create a new configuration builder
    pub fn builder() -> EconomyConfigBuilder {
        EconomyConfigBuilder::default()
    }

    /// Load configuration from the environment
    ///
    /// Reads `OPENAI_API_KEY`, `FRED_API_KEY`, `NEWS_API_KEY`,
    /// `FINNHUB_API_KEY`, `SEC_USER_AGENT`, `ECONOMY_MODEL`,
    /// `ECONOMY_OUTPUT_DIR`, `ECONOMY_CALL_TIMEOUT_SECS`, `VERBOSE` and
    /// `AUTO_SAVE`. Missing data keys are not an error; the collectors that
    /// need them report the gap inline.
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(EconomyError::ConfigError("model must not be empty".to_string()));
        }

        if self.max_loops == 0 {
            return Err(EconomyError::ConfigError(
                "max_loops must be greater than 0".to_string(),
            ));
        }

        self.truncation.validate()
    }

    /// Debug log writer, when auto-save is enabled
    pub fn debug_log(&self) -> Option<DebugLog> {
        self.auto_save.then(|| DebugLog::new(&self.output_dir))
    }
}

/// Builder for EconomyConfig
#[derive(Debug, Default)]
pub struct EconomyConfigBuilder {
    openai_api_key: Option<String>,
    fred_api_key: Option<String>,
    news_api_key: Option<String>,
    finnhub_api_key: Option<String>,
    sec_user_agent: Option<String>,
    model: Option<String>,
    stop_token: Option<String>,
    max_loops: Option<usize>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    request_timeout: Option<Duration>,
    call_timeout: Option<Duration>,
    verbose: Option<bool>,
    auto_save: Option<bool>,
    output_dir: Option<PathBuf>,
    truncation: Option<TruncationPolicy>,
}

impl EconomyConfigBuilder {
    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    pub fn fred_api_key(mut self, key: impl Into<String>) -> Self {
        self.fred_api_key = Some(key.into());
        self
    }

    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    pub fn finnhub_api_key(mut self, key: impl Into<String>) -> Self {
        self.finnhub_api_key = Some(key.into());
        self
    }

    pub fn sec_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.sec_user_agent = Some(user_agent.into());
        self
    }

    /// Set the model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn stop_token(mut self, token: impl Into<String>) -> Self {
        self.stop_token = Some(token.into());
        self
    }

    pub fn max_loops(mut self, loops: usize) -> Self {
        self.max_loops = Some(loops);
        self
    }

    pub fn max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the HTTP timeout for data collectors
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Bound each analyst run inside the swarm
    pub fn call_timeout(mut self, duration: Duration) -> Self {
        self.call_timeout = Some(duration);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    pub fn auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = Some(auto_save);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn truncation(mut self, policy: TruncationPolicy) -> Self {
        self.truncation = Some(policy);
        self
    }

    /// Fill unset fields from environment variables
    pub fn with_env(mut self) -> Self {
        self.openai_api_key = self.openai_api_key.or_else(|| env_var("OPENAI_API_KEY"));
        self.fred_api_key = self.fred_api_key.or_else(|| env_var("FRED_API_KEY"));
        self.news_api_key = self.news_api_key.or_else(|| env_var("NEWS_API_KEY"));
        self.finnhub_api_key = self.finnhub_api_key.or_else(|| env_var("FINNHUB_API_KEY"));
        self.sec_user_agent = self.sec_user_agent.or_else(|| env_var("SEC_USER_AGENT"));
        self.model = self.model.or_else(|| env_var("ECONOMY_MODEL"));
        self.output_dir = self
            .output_dir
            .or_else(|| env_var("ECONOMY_OUTPUT_DIR").map(PathBuf::from));
        self.call_timeout = self.call_timeout.or_else(|| {
            env_parse::<u64>("ECONOMY_CALL_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
        });
        self.verbose = self.verbose.or(Some(env_flag("VERBOSE", false)));
        self.auto_save = self.auto_save.or(Some(env_flag("AUTO_SAVE", false)));
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EconomyConfig> {
        let defaults = EconomyConfig::default();

        let config = EconomyConfig {
            openai_api_key: self.openai_api_key,
            fred_api_key: self.fred_api_key,
            news_api_key: self.news_api_key,
            finnhub_api_key: self.finnhub_api_key,
            sec_user_agent: self.sec_user_agent.unwrap_or(defaults.sec_user_agent),
            model: self.model.unwrap_or(defaults.model),
            stop_token: self.stop_token.unwrap_or(defaults.stop_token),
            max_loops: self.max_loops.unwrap_or(defaults.max_loops),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.or(defaults.temperature),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            call_timeout: self.call_timeout.or(defaults.call_timeout),
            verbose: self.verbose.unwrap_or(defaults.verbose),
            auto_save: self.auto_save.unwrap_or(defaults.auto_save),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            truncation: self.truncation.unwrap_or(defaults.truncation),
        };

        config.validate()?;
        Ok(config)
    }
}
