//! One JSON record per analyst call, for offline inspection
//!
//! Records are write-only; nothing in the pipeline reads them back.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of a debug record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugRecord {
    pub agent: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub prompt: String,
    pub output: String,
}

/// Writes debug records into a directory
#[derive(Debug, Clone)]
pub struct DebugLog {
    dir: PathBuf,
}

impl DebugLog {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a record; failures are logged and swallowed
    pub async fn record(&self, agent: &str, prompt: &str, output: &str) -> Option<PathBuf> {
        match self.try_record(agent, prompt, output).await {
            Ok(path) => {
                tracing::debug!(agent, path = %path.display(), "debug record written");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(agent, dir = %self.dir.display(), error = %e, "failed to write debug record");
                None
            }
        }
    }

    async fn try_record(&self, agent: &str, prompt: &str, output: &str) -> std::io::Result<PathBuf> {
        let now = Utc::now();
        let record = DebugRecord {
            agent: agent.to_string(),
            timestamp: now.to_rfc3339(),
            prompt: prompt.to_string(),
            output: output.to_string(),
        };

        let id = uuid::Uuid::new_v4().simple().to_string();
        let file_name = format!(
            "{}_{}_{}.json",
            sanitize(agent),
            now.format("%Y%m%dT%H%M%S"),
            &id[..8]
        );
        let path = self.dir.join(file_name);

        let body = serde_json::to_vec_pretty(&record).map_err(std::io::Error::other)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, body).await?;
        Ok(path)
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_written() {
        let dir = tempfile::tempdir().unwrap();
        let log = DebugLog::new(dir.path().join("nested"));

        let path = log.record("MacroAgent", "prompt text", "output text").await.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("MacroAgent_"));
        assert!(name.ends_with(".json"));

        let raw = std::fs::read_to_string(&path).unwrap();
        let record: DebugRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(record.agent, "MacroAgent");
        assert_eq!(record.prompt, "prompt text");
        assert_eq!(record.output, "output text");
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_record_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let log = DebugLog::new(&blocker);
        assert!(log.record("MacroAgent", "p", "o").await.is_none());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("fixed income/refine"), "fixed_income_refine");
    }
}
