//! LLM provider abstraction layer
//!
//! This crate provides provider-agnostic abstractions for text generation:
//!
//! - Message types for LLM communication
//! - Completion request/response types
//! - Reply-shape normalization ([`TextResponse`])
//! - Provider trait for LLM implementations
//! - Concrete provider implementations (behind feature flags)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod response;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;
pub use response::{TextResponse, strip_stop_token};

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
