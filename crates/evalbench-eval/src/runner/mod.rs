//! Run execution
//!
//! This module provides the harness configuration and the orchestrator
//! that drives a model through a suite.

mod config;
mod orchestrator;

pub use config::{FailurePolicy, HarnessConfig, default_system_prompt};
pub use orchestrator::{CaseProgress, ProgressCallback, RunOrchestrator, RunOutcome};
