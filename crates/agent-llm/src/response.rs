//! Reply-shape handling for text-generation output
//!
//! Models sometimes answer with a bare string and sometimes with a JSON
//! object wrapping the answer under one of a few conventional keys.
//! [`TextResponse`] captures both shapes and [`TextResponse::normalize`]
//! extracts the answer with a fixed search order.

use serde_json::{Map, Value};

/// Keys checked, in order, when a reply is a JSON object
pub const ANSWER_KEYS: [&str; 3] = ["response", "output", "result"];

/// A string field must be strictly longer than this to be taken as the answer
/// when none of [`ANSWER_KEYS`] is present
pub const MIN_FALLBACK_CHARS: usize = 100;

/// Reply from a text-generation call
#[derive(Debug, Clone, PartialEq)]
pub enum TextResponse {
    /// Free text
    PlainText(String),
    /// A JSON object; field order is preserved as received
    StructuredText(Map<String, Value>),
}

impl TextResponse {
    /// Classify raw model output
    ///
    /// Output that parses as a JSON object is structured; everything else,
    /// including JSON arrays and scalars, is plain text.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('{') {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
                return Self::StructuredText(map);
            }
        }
        Self::PlainText(raw.to_string())
    }

    /// Extract the answer text
    ///
    /// Plain text is returned unchanged. For structured replies the first of
    /// `response`, `output`, `result` that is present wins, with non-string
    /// values rendered as JSON and `null` as empty; failing that, the first
    /// string value longer than [`MIN_FALLBACK_CHARS`] characters. An
    /// unrecognised shape yields an empty string.
    pub fn normalize(&self) -> String {
        match self {
            Self::PlainText(text) => text.clone(),
            Self::StructuredText(map) => match ANSWER_KEYS.iter().find_map(|key| map.get(*key)) {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Null) => String::new(),
                Some(other) => other.to_string(),
                None => map
                    .values()
                    .filter_map(Value::as_str)
                    .find(|s| s.chars().count() > MIN_FALLBACK_CHARS)
                    .unwrap_or_default()
                    .to_string(),
            },
        }
    }
}

impl From<String> for TextResponse {
    fn from(text: String) -> Self {
        Self::PlainText(text)
    }
}

impl From<Map<String, Value>> for TextResponse {
    fn from(map: Map<String, Value>) -> Self {
        Self::StructuredText(map)
    }
}

/// Remove one trailing stop token and surrounding whitespace
pub fn strip_stop_token(text: &str, stop_token: &str) -> String {
    let trimmed = text.trim_end();
    let without = if stop_token.is_empty() {
        trimmed
    } else {
        trimmed.strip_suffix(stop_token).unwrap_or(trimmed)
    };
    without.trim().to_string()
}
