//! Evalbench evaluation engine
//!
//! This crate drives benchmark runs: it discovers the tasks of a suite,
//! renders each case's prompt, calls the model adapter, scores the output
//! with the task's evaluator and records the run on disk. Recorded runs are
//! later folded into a leaderboard.
//!
//! # Example
//!
//! ```rust,ignore
//! use evalbench_eval::{HarnessConfig, RunOrchestrator};
//!
//! let config = HarnessConfig::new(".").with_max_cases(1);
//! let orchestrator = RunOrchestrator::from_config(config)?;
//! let outcome = orchestrator.run("mock", "programming_general").await?;
//! println!("{}", outcome.run_dir.display());
//! ```

pub mod evaluators;
pub mod leaderboard;
pub mod record;
pub mod runner;
pub mod tasks;

// Re-exports for convenience
pub use evaluators::{EvalContext, EvaluationResult, Evaluator, EvaluatorRegistry};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use record::{ResultRow, RunMeta, RunRecorder, TaskSummary};
pub use runner::{CaseProgress, FailurePolicy, HarnessConfig, RunOrchestrator, RunOutcome};
pub use tasks::{Case, EvaluatorSpec, PromptTemplate, TaskConfig, TaskLoader};
