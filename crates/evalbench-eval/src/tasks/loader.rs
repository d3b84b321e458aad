//! Suite discovery and task loading
//!
//! Loads task configurations, prompt templates and cases from the suites directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use evalbench_core::utils::read_jsonl;
use evalbench_core::{BenchError, BenchResult, ResultExt};
use serde_json::Value;

use super::{Case, PromptTemplate, TaskConfig};
use crate::record::check_path_component;

const TASK_FILE: &str = "task.yml";

/// Loader for suites and their tasks
#[derive(Debug, Clone)]
pub struct TaskLoader {
    /// Base directory containing one directory per suite
    suites_dir: PathBuf,
}

impl TaskLoader {
    /// Create a new task loader over the given suites directory
    pub fn new(suites_dir: impl AsRef<Path>) -> Self {
        Self {
            suites_dir: suites_dir.as_ref().to_path_buf(),
        }
    }

    /// Root of all suites
    pub fn suites_dir(&self) -> &Path {
        &self.suites_dir
    }

    /// Suites that contain a `tasks/` directory, sorted by name
    pub fn list_suites(&self) -> BenchResult<Vec<String>> {
        if !self.suites_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut suites = Vec::new();
        for entry in std::fs::read_dir(&self.suites_dir).with_path(&self.suites_dir)? {
            let entry = entry.with_path(&self.suites_dir)?;
            if entry.path().join("tasks").is_dir() {
                suites.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        suites.sort();
        Ok(suites)
    }

    /// Task directories of a suite, ordered by directory name.
    ///
    /// This ordering is the case-processing order of every run.
    pub fn discover(&self, suite: &str) -> BenchResult<Vec<PathBuf>> {
        let tasks_dir = self.suites_dir.join(suite).join("tasks");
        if !tasks_dir.is_dir() {
            return Err(BenchError::config_with_context(
                format!("Suite not found: {}", suite),
                tasks_dir.display().to_string(),
            ));
        }

        let mut task_dirs = Vec::new();
        for entry in std::fs::read_dir(&tasks_dir).with_path(&tasks_dir)? {
            let path = entry.with_path(&tasks_dir)?.path();
            if path.is_dir() {
                task_dirs.push(path);
            }
        }
        task_dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        tracing::debug!(suite = %suite, tasks = task_dirs.len(), "Discovered tasks");
        Ok(task_dirs)
    }

    /// Load a task's `task.yml`
    pub fn load(&self, task_dir: &Path) -> BenchResult<TaskConfig> {
        let path = task_dir.join(TASK_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            BenchError::config_with_context(
                format!("Failed to read task config: {}", e),
                path.display().to_string(),
            )
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            BenchError::config_with_context(
                format!("Failed to parse task config: {}", e),
                path.display().to_string(),
            )
        })
    }

    /// Read and parse the task's prompt template
    pub fn prompt_template(&self, task_dir: &Path, config: &TaskConfig) -> BenchResult<PromptTemplate> {
        let path = task_dir.join(&config.prompt);
        let source = std::fs::read_to_string(&path).map_err(|e| {
            BenchError::config_with_context(
                format!("Failed to read prompt template: {}", e),
                path.display().to_string(),
            )
        })?;

        PromptTemplate::parse(&source).map_err(|e| {
            BenchError::config_with_context(e.message().to_string(), path.display().to_string())
        })
    }

    /// Load the task's cases in file order, keeping only the first
    /// `max_cases` when a limit is given.
    ///
    /// Case ids must be present, unique within the task and usable as a
    /// directory name.
    pub fn cases(
        &self,
        task_dir: &Path,
        config: &TaskConfig,
        max_cases: Option<usize>,
    ) -> BenchResult<Vec<Case>> {
        let path = task_dir.join(&config.cases);
        let records: Vec<Value> = read_jsonl(&path).map_err(|e| {
            BenchError::config_with_context(
                format!("Failed to load cases: {}", e.message()),
                path.display().to_string(),
            )
        })?;

        let mut seen = HashSet::new();
        let mut cases = Vec::with_capacity(records.len());
        for record in records {
            let case = Case::from_value(record).map_err(|e| {
                BenchError::config_with_context(
                    e.message().to_string(),
                    format!("task {}", config.id),
                )
            })?;
            check_path_component("case_id", &case.case_id).map_err(|e| {
                BenchError::config_with_context(e.message().to_string(), format!("task {}", config.id))
            })?;
            if !seen.insert(case.case_id.clone()) {
                return Err(BenchError::config_with_context(
                    format!("Duplicate case_id '{}'", case.case_id),
                    format!("task {}", config.id),
                ));
            }
            cases.push(case);
        }

        if let Some(limit) = max_cases {
            cases.truncate(limit);
        }
        Ok(cases)
    }
}
