//! Harness configuration
//!
//! Configuration options for benchmark runs.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the orchestrator does when a single case fails with a template,
/// generation or evaluation error.
///
/// Configuration errors always abort the run, whatever the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record a failed row for the case and continue with the next one
    #[default]
    Isolate,
    /// Stop the run on the first failing case
    Abort,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Isolate => write!(f, "isolate"),
            FailurePolicy::Abort => write!(f, "abort"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "isolate" => Ok(FailurePolicy::Isolate),
            "abort" => Ok(FailurePolicy::Abort),
            other => Err(format!(
                "unknown failure policy '{}' (expected 'isolate' or 'abort')",
                other
            )),
        }
    }
}

/// Configuration for benchmark runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Project root (used for `.git` lookup)
    pub root: PathBuf,

    /// Model registry document
    pub registry_path: PathBuf,

    /// Directory holding one directory per suite
    pub suites_dir: PathBuf,

    /// Where run directories are created
    pub runs_dir: PathBuf,

    /// System prompt sent with every case
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Task ids to run (empty = all)
    #[serde(default)]
    pub task_ids: Vec<String>,

    /// Keep only the first N cases of each task
    #[serde(default)]
    pub max_cases: Option<usize>,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Interpreter for Python-backed evaluators
    #[serde(default = "default_python")]
    pub python: String,

    /// Overrides each evaluator's own subprocess timeout
    #[serde(default)]
    pub evaluator_timeout_secs: Option<u64>,
}

pub fn default_system_prompt() -> String {
    "Eres un asistente útil y preciso.".to_string()
}

fn default_python() -> String {
    "python3".to_string()
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

impl HarnessConfig {
    /// Configuration with the conventional layout under `root`:
    /// `models/registry.yml`, `suites/` and `runs/`
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            registry_path: root.join("models").join("registry.yml"),
            suites_dir: root.join("suites"),
            runs_dir: root.join("runs"),
            root,
            system_prompt: default_system_prompt(),
            task_ids: Vec::new(),
            max_cases: None,
            failure_policy: FailurePolicy::default(),
            python: default_python(),
            evaluator_timeout_secs: None,
        }
    }

    /// Set the registry path
    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = path.into();
        self
    }

    /// Set the suites directory
    pub fn with_suites_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.suites_dir = dir.into();
        self
    }

    /// Set the runs directory
    pub fn with_runs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.runs_dir = dir.into();
        self
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Restrict the run to these task ids
    pub fn with_task_ids(mut self, ids: Vec<String>) -> Self {
        self.task_ids = ids;
        self
    }

    /// Limit cases per task
    pub fn with_max_cases(mut self, max_cases: usize) -> Self {
        self.max_cases = Some(max_cases);
        self
    }

    /// Set the per-case failure policy
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the Python interpreter
    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    /// Override evaluator timeouts
    pub fn with_evaluator_timeout(mut self, secs: u64) -> Self {
        self.evaluator_timeout_secs = Some(secs);
        self
    }

    /// Whether a task takes part in the run
    pub fn selects_task(&self, task_id: &str) -> bool {
        self.task_ids.is_empty() || self.task_ids.iter().any(|id| id == task_id)
    }
}
