//! Persisted run records

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use evalbench_core::{BenchError, ModelConfig, Usage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::evaluators::{EvaluationResult, SCORE_TOTAL};

/// One processed case, the atomic unit of `results.jsonl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub suite: String,
    pub task_id: String,
    pub case_id: String,

    /// SHA-256 of the rendered prompt; absent when rendering failed
    pub input_hash: Option<String>,

    pub prompt: Option<String>,

    pub raw_output: Option<String>,

    #[serde(default)]
    pub usage: Usage,

    pub latency_ms: Option<u64>,

    #[serde(default)]
    pub scores: BTreeMap<String, f64>,

    pub pass_fail: bool,

    #[serde(default)]
    pub notes: String,

    /// Set when the case failed and was isolated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultRow {
    /// Empty row for a case about to be processed
    pub fn new(
        suite: impl Into<String>,
        task_id: impl Into<String>,
        case_id: impl Into<String>,
    ) -> Self {
        Self {
            suite: suite.into(),
            task_id: task_id.into(),
            case_id: case_id.into(),
            input_hash: None,
            prompt: None,
            raw_output: None,
            usage: Usage::default(),
            latency_ms: None,
            scores: BTreeMap::new(),
            pass_fail: false,
            notes: String::new(),
            error: None,
        }
    }

    /// Copy an evaluation into the row
    pub fn apply_evaluation(&mut self, evaluation: EvaluationResult) {
        self.pass_fail = evaluation.pass_fail;
        self.scores = evaluation.scores;
        self.notes = evaluation.notes;
    }

    /// Mark the row as failed by `error`, keeping whatever was already filled in
    pub fn mark_failed(&mut self, error: &BenchError) {
        self.pass_fail = false;
        self.scores = BTreeMap::from([(SCORE_TOTAL.to_string(), 0.0)]);
        self.notes = format!("case failed: {}", error.error_code());
        self.error = Some(error.to_string());
    }

    /// Scalar score of the row
    pub fn score_total(&self) -> f64 {
        match self.scores.get(SCORE_TOTAL) {
            Some(total) => *total,
            None => self.scores.values().sum(),
        }
    }
}

/// Task entry in [`RunMeta`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: String,
    pub name: String,
    pub cases: usize,
}

/// Run metadata, written once at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    pub run_id: String,
    pub timestamp_utc: DateTime<Utc>,
    pub source_revision: Option<String>,
    pub model: ModelConfig,
    pub suite: String,
    pub tasks: Vec<TaskSummary>,

    /// Left empty; aggregation happens downstream
    #[serde(default)]
    pub aggregates: serde_json::Map<String, Value>,
}
