//! Per-domain results collected by the swarm

use agent_core::{Error, Outcome};
use serde::{Deserialize, Serialize};

/// How a domain insight was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightStatus {
    Ok,
    Degraded,
    Error,
}

impl InsightStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Degraded => "degraded",
            Self::Error => "error",
        }
    }
}

impl From<&Outcome> for InsightStatus {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Success(_) => Self::Ok,
            Outcome::Degraded(_) => Self::Degraded,
            Outcome::Failed(_) => Self::Error,
        }
    }
}

/// Text produced for one domain, never empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInsight {
    pub domain: String,
    pub text: String,
    pub status: InsightStatus,
}

impl DomainInsight {
    pub fn new(domain: impl Into<String>, text: impl Into<String>, status: InsightStatus) -> Self {
        Self {
            domain: domain.into(),
            text: text.into(),
            status,
        }
    }

    /// Inline `"Error: <message>"` for a domain whose analyst raised
    pub fn error(domain: impl Into<String>, err: &Error) -> Self {
        Self::new(domain, format!("Error: {err}"), InsightStatus::Error)
    }

    /// Convert an analyst's result, substituting the fallback message for empty text
    pub fn from_result(domain: &str, agent_name: &str, result: agent_core::Result<Outcome>) -> Self {
        match result {
            Ok(outcome) => {
                let status = InsightStatus::from(&outcome);
                let text = outcome.into_text();
                if text.trim().is_empty() {
                    Self::new(domain, analysis_fallback(agent_name), InsightStatus::Degraded)
                } else {
                    Self::new(domain, text, status)
                }
            }
            Err(err) => Self::error(domain, &err),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.status == InsightStatus::Ok
    }
}

/// Message used when an analyst produced nothing
pub fn analysis_fallback(agent_name: &str) -> String {
    format!("The {agent_name} was unable to generate a proper analysis. Please check the logs for details.")
}

/// Message used when the synthesis produced nothing
pub fn summary_fallback(agent_name: &str) -> String {
    format!("The {agent_name} was unable to generate a proper summary. Please check the logs for details.")
}

/// Task and ordered insights handed to the synthesis step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationRequest {
    pub task: String,
    /// In registration order
    pub insights: Vec<DomainInsight>,
}

impl AggregationRequest {
    pub fn new(task: impl Into<String>, insights: Vec<DomainInsight>) -> Self {
        Self {
            task: task.into(),
            insights,
        }
    }

    pub fn get(&self, domain: &str) -> Option<&DomainInsight> {
        self.insights.iter().find(|insight| insight.domain == domain)
    }

    /// `(domain, text)` pairs in order
    pub fn texts(&self) -> Vec<(&str, &str)> {
        self.insights
            .iter()
            .map(|insight| (insight.domain.as_str(), insight.text.as_str()))
            .collect()
    }

    pub fn failed_domains(&self) -> Vec<&str> {
        self.insights
            .iter()
            .filter(|insight| insight.status == InsightStatus::Error)
            .map(|insight| insight.domain.as_str())
            .collect()
    }
}

/// Final summary plus the insights it was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub request: AggregationRequest,
    pub final_text: String,
    pub status: InsightStatus,
    /// Whether the insights went through the refinement pass
    pub refined: bool,
}
