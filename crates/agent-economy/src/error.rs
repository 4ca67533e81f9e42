//! Error types for economic data collection and analysis

use thiserror::Error;

/// Errors raised by collectors, analysts and configuration
#[derive(Debug, Error)]
pub enum EconomyError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// A required credential is not configured
    #[error("{0} is not configured")]
    MissingCredential(&'static str),

    /// The source answered but had nothing usable
    #[error("No data available for {subject}: {reason}")]
    DataUnavailable {
        subject: String,
        reason: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Text-generation failure
    #[error("{0}")]
    LlmError(#[from] agent_llm::LLMError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for economy operations
pub type Result<T> = std::result::Result<T, EconomyError>;

impl EconomyError {
    pub fn unavailable(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}

/// Convert EconomyError to agent_core::Error
impl From<EconomyError> for agent_core::Error {
    fn from(err: EconomyError) -> Self {
        agent_core::Error::ProcessingFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EconomyError::MissingCredential("FRED_API_KEY");
        assert_eq!(err.to_string(), "FRED_API_KEY is not configured");

        let err = EconomyError::unavailable("^TNX", "empty history");
        assert_eq!(err.to_string(), "No data available for ^TNX: empty history");
    }

    #[test]
    fn test_error_conversion() {
        let err: agent_core::Error = EconomyError::ApiError("FRED API error: 500".to_string()).into();
        match err {
            agent_core::Error::ProcessingFailed(msg) => assert!(msg.contains("FRED API error")),
            _ => panic!("Expected ProcessingFailed variant"),
        }
    }
}
