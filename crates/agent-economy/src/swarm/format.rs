//! Length caps and prompt formatting for domain insights

use super::insight::DomainInsight;
use crate::error::{EconomyError, Result};
use serde::{Deserialize, Serialize};

pub const INSIGHTS_HEADER: &str = "=== DOMAIN INSIGHTS ===";
pub const INSIGHTS_FOOTER: &str = "=== END DOMAIN INSIGHTS ===";
pub const DEFAULT_TRUNCATION_MARKER: &str = "\n...[truncated]...\n";

/// Character budgets applied to insight text before it enters a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationPolicy {
    /// Insights longer than this are cut
    pub threshold_chars: usize,
    /// Characters kept from each end of a cut insight
    pub head_tail_chars: usize,
    /// Characters of each peer insight shown during refinement
    pub condensed_chars: usize,
    /// Joins the head and tail of a cut insight
    pub marker: String,
}

impl Default for TruncationPolicy {
    fn default() -> Self {
        Self {
            threshold_chars: 6000,
            head_tail_chars: 2000,
            condensed_chars: 800,
            marker: DEFAULT_TRUNCATION_MARKER.to_string(),
        }
    }
}

impl TruncationPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.head_tail_chars == 0 || self.condensed_chars == 0 {
            return Err(EconomyError::ConfigError(
                "truncation lengths must be greater than 0".to_string(),
            ));
        }
        if self.condensed_chars >= self.head_tail_chars {
            return Err(EconomyError::ConfigError(format!(
                "condensed length ({}) must be below the head/tail length ({})",
                self.condensed_chars, self.head_tail_chars
            )));
        }
        if self.head_tail_chars.saturating_mul(2) > self.threshold_chars {
            return Err(EconomyError::ConfigError(format!(
                "head/tail length ({}) must fit twice within the threshold ({})",
                self.head_tail_chars, self.threshold_chars
            )));
        }
        Ok(())
    }

    /// First and last `head_tail_chars` joined by the marker, for text over the threshold
    pub fn truncate(&self, text: &str) -> String {
        let len = text.chars().count();
        // head and tail would overlap
        if len <= self.threshold_chars || len <= self.head_tail_chars.saturating_mul(2) {
            return text.to_string();
        }

        let head: String = text.chars().take(self.head_tail_chars).collect();
        let tail: String = text.chars().skip(len.saturating_sub(self.head_tail_chars)).collect();
        format!("{head}{}{tail}", self.marker)
    }

    /// First `condensed_chars` characters
    pub fn condense(&self, text: &str) -> String {
        text.chars().take(self.condensed_chars).collect()
    }
}

/// `"{DOMAIN} DOMAIN SUMMARY:\n{text}"`
pub fn domain_section(domain: &str, text: &str) -> String {
    format!("{} DOMAIN SUMMARY:\n{}", domain.to_uppercase(), text)
}

/// All insights, truncated, between the insight delimiters
pub fn insights_block(insights: &[DomainInsight], policy: &TruncationPolicy) -> String {
    let mut block = format!("{INSIGHTS_HEADER}\n\n");
    for insight in insights {
        block.push_str(&domain_section(&insight.domain, &policy.truncate(&insight.text)));
        block.push_str("\n\n");
    }
    block.push_str(INSIGHTS_FOOTER);
    block
}

/// Condensed sections for every insight except `own_domain`
pub fn peer_context(insights: &[DomainInsight], own_domain: &str, policy: &TruncationPolicy) -> String {
    insights
        .iter()
        .filter(|insight| insight.domain != own_domain)
        .map(|insight| domain_section(&insight.domain, &policy.condense(&insight.text)))
        .collect::<Vec<_>>()
        .join("\n\n")
}
