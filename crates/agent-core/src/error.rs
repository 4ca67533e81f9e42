//! Error types for agent-core

use std::time::Duration;
use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent initialization failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent processing failed
    #[error("{0}")]
    ProcessingFailed(String),

    /// The task or input was rejected
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The agent did not finish within its time budget
    #[error("Agent '{agent}' timed out after {limit:?}")]
    Timeout {
        agent: String,
        limit: Duration,
    },
}
