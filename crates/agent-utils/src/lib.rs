//! Shared utilities for the agent workspace
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup and environment-driven configuration helpers.

pub mod config;
pub mod logging;

pub use config::{env_flag, env_parse, env_var};
pub use logging::{init_tracing, init_tracing_with};
