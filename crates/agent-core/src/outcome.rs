//! Typed result of a single agent run

use serde::{Deserialize, Serialize};

/// Terminal state of one agent invocation
///
/// Every variant carries display-ready text, so callers that only need the
/// textual summary can use [`Outcome::into_text`] without matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum Outcome {
    /// Usable analysis text
    Success(String),
    /// The model replied but nothing usable came back; holds the fallback message
    Degraded(String),
    /// The agent caught a failure of its own; holds the readable error message
    Failed(String),
}

impl Outcome {
    /// Borrow the text carried by this outcome
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Degraded(text) | Self::Failed(text) => text,
        }
    }

    /// Consume the outcome and return its text
    pub fn into_text(self) -> String {
        match self {
            Self::Success(text) | Self::Degraded(text) | Self::Failed(text) => text,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Short label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Degraded(_) => "degraded",
            Self::Failed(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_accessors() {
        let outcome = Outcome::Degraded("fallback".to_string());
        assert_eq!(outcome.text(), "fallback");
        assert!(!outcome.is_success());
        assert_eq!(outcome.label(), "degraded");
        assert_eq!(outcome.into_text(), "fallback");
    }

    #[test]
    fn test_serialization_shape() {
        let json = serde_json::to_value(Outcome::Success("ok".to_string())).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["text"], "ok");
    }
}
