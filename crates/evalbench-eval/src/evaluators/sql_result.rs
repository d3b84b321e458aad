//! Executes a generated SQL query against an in-memory SQLite database

use std::path::Path;

use async_trait::async_trait;
use evalbench_core::utils::extract_sql;
use evalbench_core::{BenchError, BenchResult, ResultExt};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Connection, Executor, Row};

use super::{EvalContext, EvaluationResult, Evaluator, SCORE_TOTAL};
use crate::tasks::{Case, EvaluatorSpec};

const DEFAULT_SCHEMA_FILE: &str = "schema.sql";
const QUERY_FILE: &str = "model.sql";
const GOT_FILE: &str = "got.json";
const POINTS: f64 = 2.0;

/// One normalized result row: a label and a numeric value
pub type ResultPair = (String, f64);

/// Runs the task schema in a fresh in-memory database, executes the first
/// SQL statement of the model output and compares the rows, in order, to
/// the expected `(text, number)` pairs.
#[derive(Debug, Clone)]
pub struct SqlResultEvaluator {
    schema: String,
    expected: Vec<ResultPair>,
}

impl SqlResultEvaluator {
    pub fn new(schema: impl Into<String>, expected: Vec<ResultPair>) -> Self {
        Self {
            schema: schema.into(),
            expected,
        }
    }

    /// Options: `schema` (default `schema.sql`), `expected` (list of `[text, number]`)
    pub fn from_spec(spec: &EvaluatorSpec, ctx: &EvalContext) -> BenchResult<Self> {
        let schema_path = ctx.task_file(spec.option_str("schema").unwrap_or(DEFAULT_SCHEMA_FILE));
        let schema = std::fs::read_to_string(&schema_path).map_err(|e| {
            BenchError::config_with_context(
                format!("Failed to read schema: {}", e),
                schema_path.display().to_string(),
            )
        })?;

        let expected = match spec.options.get("expected") {
            Some(value) => parse_expected(value)?,
            None => {
                return Err(BenchError::config(
                    "sql_result evaluator requires an 'expected' list",
                ));
            }
        };

        Ok(Self::new(schema, expected))
    }

    async fn run_query(&self, sql: &str) -> Result<Vec<ResultPair>, sqlx::Error> {
        let mut conn = SqliteConnection::connect("sqlite::memory:").await?;
        (&mut conn).execute(sqlx::raw_sql(&self.schema)).await?;

        let rows = (&mut conn).fetch_all(sqlx::query(sql)).await?;
        let pairs = rows.iter().map(normalize_row).collect::<Result<Vec<_>, _>>()?;

        conn.close().await?;
        Ok(pairs)
    }
}

fn parse_expected(value: &Value) -> BenchResult<Vec<ResultPair>> {
    let invalid = || BenchError::config("'expected' must be a list of [text, number] pairs");
    let items = value.as_array().ok_or_else(invalid)?;

    items
        .iter()
        .map(|item| {
            let pair = item.as_array().filter(|p| p.len() == 2).ok_or_else(invalid)?;
            let label = match &pair[0] {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return Err(invalid()),
            };
            let amount = pair[1].as_f64().ok_or_else(invalid)?;
            Ok((label, amount))
        })
        .collect()
}

/// First column as text, second as a float
fn normalize_row(row: &SqliteRow) -> Result<ResultPair, sqlx::Error> {
    if row.len() < 2 {
        return Err(sqlx::Error::ColumnIndexOutOfBounds {
            index: 1,
            len: row.len(),
        });
    }

    let label = match row.try_get::<String, _>(0) {
        Ok(label) => label,
        Err(_) => row.try_get::<i64, _>(0)?.to_string(),
    };
    let amount = match row.try_get::<f64, _>(1) {
        Ok(amount) => amount,
        Err(_) => row.try_get::<i64, _>(1)? as f64,
    };
    Ok((label, amount))
}

#[async_trait]
impl Evaluator for SqlResultEvaluator {
    fn name(&self) -> &str {
        "sql_result"
    }

    #[tracing::instrument(skip(self, case, model_output), fields(case_id = %case.case_id))]
    async fn evaluate(
        &self,
        case: &Case,
        model_output: &str,
        workdir: &Path,
    ) -> BenchResult<EvaluationResult> {
        tokio::fs::create_dir_all(workdir).await.with_path(workdir)?;

        let sql = extract_sql(model_output);
        let query_path = workdir.join(QUERY_FILE);
        tokio::fs::write(&query_path, &sql).await.with_path(&query_path)?;

        let got = match self.run_query(&sql).await {
            Ok(got) => got,
            Err(e) => {
                tracing::debug!(error = %e, "Query failed");
                return Ok(EvaluationResult::failed(
                    &["correctness", SCORE_TOTAL],
                    format!("SQL execution error: {}", e),
                ));
            }
        };

        let got_path = workdir.join(GOT_FILE);
        tokio::fs::write(&got_path, serde_json::to_string(&got)?)
            .await
            .with_path(&got_path)?;

        let passed = got == self.expected;
        let score = if passed { POINTS } else { 0.0 };
        Ok(EvaluationResult::new(passed)
            .with_score("correctness", score)
            .with_score(SCORE_TOTAL, score)
            .with_notes(format!(
                "exact ordered comparison against {} expected rows (got {})",
                self.expected.len(),
                got.len()
            )))
    }
}
