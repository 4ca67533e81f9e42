//! Collected data sections
//!
//! A collector failure never aborts an analysis. Each section of collected
//! data is either usable or an inline error that the prompt carries in place
//! of the data.

use crate::error::Result;
use serde::Serialize;
use serde::ser::SerializeMap;
use std::fmt::Display;

/// One section of collected data
///
/// Serializes to the data itself, or to `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Fetched<T> {
    Data(T),
    Failed { error: String },
}

impl<T> Fetched<T> {
    pub fn failed(error: impl Display) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    /// Wrap a collector result, logging the failure under `section`
    pub fn capture(section: &str, result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::Data(data),
            Err(e) => {
                tracing::warn!(section, error = %e, "collector failed");
                Self::failed(e)
            }
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Data(data) => Some(data),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Data(_) => None,
            Self::Failed { error } => Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Data(data) => Fetched::Data(f(data)),
            Self::Failed { error } => Fetched::Failed { error },
        }
    }
}

impl<T> From<Result<T>> for Fetched<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::Data(data),
            Err(e) => Self::failed(e),
        }
    }
}

impl<T: Serialize> Fetched<T> {
    /// Pretty JSON for embedding in a prompt
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
    }
}

/// Named sections kept in insertion order
///
/// Serializes to a JSON object keyed by section name.
#[derive(Debug, Clone, PartialEq)]
pub struct Sections<T> {
    entries: Vec<(String, Fetched<T>)>,
}

impl<T> Default for Sections<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> Sections<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, section: Fetched<T>) {
        self.entries.push((name.into(), section));
    }

    pub fn get(&self, name: &str) -> Option<&Fetched<T>> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fetched<T>)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Sections that hold data, in order
    pub fn available(&self) -> impl Iterator<Item = (&str, &T)> {
        self.iter().filter_map(|(n, s)| s.data().map(|d| (n, d)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when there is at least one section and none holds data
    pub fn all_failed(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|(_, s)| s.is_failed())
    }
}

impl<T> FromIterator<(String, Fetched<T>)> for Sections<T> {
    fn from_iter<I: IntoIterator<Item = (String, Fetched<T>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T: Serialize> Serialize for Sections<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, section) in &self.entries {
            map.serialize_entry(name, section)?;
        }
        map.end()
    }
}

impl<T: Serialize> Sections<T> {
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
    }
}
