//! Task and case types

use evalbench_core::{BenchError, BenchResult, Params};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declarative task configuration read from `task.yml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Task identifier, unique within a suite
    pub id: String,

    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Prompt template path, relative to the task directory
    pub prompt: String,

    /// Case stream path, relative to the task directory
    pub cases: String,

    /// Evaluator variant scoring this task
    pub evaluator: EvaluatorSpec,
}

/// Evaluator selection: a registry tag plus free-form options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorSpec {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub options: Params,
}

impl EvaluatorSpec {
    /// Evaluator selection without options
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: Params::new(),
        }
    }

    /// Add an option
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// String option lookup
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// Non-negative integer option lookup
    pub fn option_u64(&self, key: &str) -> Option<u64> {
        self.options.get(key).and_then(Value::as_u64)
    }
}

/// One case of a task: its id plus the template variables.
///
/// `fields` keeps the whole record, `case_id` included, so templates and
/// evaluators see exactly what the case file contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub case_id: String,
    pub fields: Params,
}

impl Case {
    /// Build a case from one decoded line of a case stream.
    ///
    /// `case_id` may be a string or a number; anything else is rejected.
    pub fn from_value(value: Value) -> BenchResult<Self> {
        let fields = match value {
            Value::Object(map) => map,
            other => {
                return Err(BenchError::config(format!(
                    "case must be a JSON object, got: {}",
                    other
                )));
            }
        };

        let case_id = match fields.get("case_id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return Err(BenchError::config(format!(
                    "case_id must be a string or a number, got: {}",
                    other
                )));
            }
            None => return Err(BenchError::config("case is missing 'case_id'")),
        };

        Ok(Self { case_id, fields })
    }

    /// Field lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String field lookup
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}
