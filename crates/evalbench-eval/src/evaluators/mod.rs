//! Evaluator capability and built-in evaluators
//!
//! An evaluator scores one case's model output. It owns a scratch directory
//! per case where it may leave artifacts (extracted code, query results,
//! process logs) for later inspection.

mod formal_email;
mod sql_result;

pub use formal_email::FormalEmailEvaluator;
pub use python_tests::PythonTestsEvaluator;
pub use sql_result::SqlResultEvaluator;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use evalbench_core::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};

use crate::tasks::{Case, EvaluatorSpec};

/// Key holding the scalar total in [`EvaluationResult::scores`]
pub const SCORE_TOTAL: &str = "score_total";

/// Score record produced by an evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub pass_fail: bool,
    pub scores: BTreeMap<String, f64>,
    pub notes: String,
}

impl EvaluationResult {
    /// Create a result with no scores
    pub fn new(pass_fail: bool) -> Self {
        Self {
            pass_fail,
            scores: BTreeMap::new(),
            notes: String::new(),
        }
    }

    /// Failing result with the given score keys zeroed
    pub fn failed(score_keys: &[&str], notes: impl Into<String>) -> Self {
        let mut result = Self::new(false).with_notes(notes);
        for key in score_keys {
            result.scores.insert((*key).to_string(), 0.0);
        }
        result
    }

    /// Set a score
    pub fn with_score(mut self, key: impl Into<String>, value: f64) -> Self {
        self.scores.insert(key.into(), value);
        self
    }

    /// Set notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Scalar total: `score_total` when present, else the sum of all scores
    pub fn score_total(&self) -> f64 {
        match self.scores.get(SCORE_TOTAL) {
            Some(total) => *total,
            None => self.scores.values().sum(),
        }
    }
}

/// Per-task context handed to evaluator factories
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// Directory of the task being evaluated (test scripts, schemas)
    pub task_dir: PathBuf,

    /// Python interpreter for subprocess-backed evaluators
    pub python: String,

    /// Overrides the evaluator's own subprocess timeout
    pub timeout: Option<Duration>,
}

impl EvalContext {
    pub fn new(task_dir: impl Into<PathBuf>) -> Self {
        Self {
            task_dir: task_dir.into(),
            python: "python3".to_string(),
            timeout: None,
        }
    }

    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve a path relative to the task directory
    pub fn task_file(&self, relative: &str) -> PathBuf {
        self.task_dir.join(relative)
    }
}

/// Capability implemented by every evaluator
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Registry tag of this evaluator
    fn name(&self) -> &str;

    /// Score `model_output` for `case`, writing artifacts into `workdir`.
    ///
    /// Internal failures (subprocess crash, timeout, invalid SQL) must be
    /// returned as a failing [`EvaluationResult`]; an `Err` is reserved for
    /// conditions the evaluator cannot express as a score.
    async fn evaluate(
        &self,
        case: &Case,
        model_output: &str,
        workdir: &Path,
    ) -> BenchResult<EvaluationResult>;
}

/// Builds an evaluator for a task. Runs once per task, before any case.
pub type EvaluatorFactory =
    Arc<dyn Fn(&EvaluatorSpec, &EvalContext) -> BenchResult<Box<dyn Evaluator>> + Send + Sync>;

/// Registry of evaluator variants keyed by tag
#[derive(Clone, Default)]
pub struct EvaluatorRegistry {
    factories: BTreeMap<String, EvaluatorFactory>,
}

impl EvaluatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `python_tests`, `sql_result` and `formal_email`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("python_tests", |spec, ctx| {
            Ok(Box::new(PythonTestsEvaluator::from_spec(spec, ctx)?))
        });
        registry.register("sql_result", |spec, ctx| {
            Ok(Box::new(SqlResultEvaluator::from_spec(spec, ctx)?))
        });
        registry.register("formal_email", |_spec, _ctx| {
            Ok(Box::new(FormalEmailEvaluator::new()))
        });
        registry
    }

    /// Register (or replace) a factory for a tag
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&EvaluatorSpec, &EvalContext) -> BenchResult<Box<dyn Evaluator>>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
    }

    /// Registered tags, sorted
    pub fn kinds(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Construct the evaluator named by `spec`
    pub fn build(&self, spec: &EvaluatorSpec, ctx: &EvalContext) -> BenchResult<Box<dyn Evaluator>> {
        let factory = self.factories.get(&spec.kind).ok_or_else(|| {
            BenchError::config_with_context(
                format!("Unknown evaluator type: {}", spec.kind),
                ctx.task_dir.display().to_string(),
            )
        })?;
        factory(spec, ctx)
    }
}

impl std::fmt::Debug for EvaluatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluatorRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
