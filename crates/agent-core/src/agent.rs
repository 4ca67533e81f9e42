//! Core Agent trait definition

use crate::{Outcome, Result};
use async_trait::async_trait;

/// Core trait implemented by every analyst in the pipeline
///
/// An agent receives a task string, gathers whatever context it needs, and
/// answers with an [`Outcome`]. Recoverable problems (an unusable model
/// reply, a failed text-generation call) are reported through the outcome so
/// the caller still receives readable text. An `Err` means the agent could
/// not run at all; orchestrators render it inline instead of aborting.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Run the agent against a task description
    async fn run(&self, task: &str) -> Result<Outcome>;

    /// Get the agent's name
    fn name(&self) -> &str;
}
