//! Core abstractions for the economic summary agents
//!
//! This crate defines the fundamental traits and types shared by every
//! analyst and by the orchestrator that combines them.

pub mod agent;
pub mod error;
pub mod outcome;

pub use agent::Agent;
pub use error::{Error, Result};
pub use outcome::Outcome;
