//! Aggregation of recorded runs

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use evalbench_core::{BenchResult, ResultExt};
use evalbench_core::utils::read_jsonl;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use walkdir::WalkDir;

use crate::evaluators::SCORE_TOTAL;
use crate::record::{META_FILE, RESULTS_FILE};

/// Statistics for one (model, suite) pair across all of its runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub suite: String,
    pub model_id: String,
    pub cases: usize,
    pub avg_score: f64,
    pub pass_rate: f64,
}

/// Sorted leaderboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Aggregate every `results.jsonl` under `runs_dir` that has a sibling
    /// `run_meta.json`. A missing directory yields an empty leaderboard.
    pub fn from_runs_dir(runs_dir: &Path) -> BenchResult<Self> {
        let mut builder = LeaderboardBuilder::default();
        if !runs_dir.exists() {
            return Ok(builder.finish());
        }

        for entry in WalkDir::new(runs_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || entry.file_name() != RESULTS_FILE {
                continue;
            }
            let Some(run_dir) = path.parent() else {
                continue;
            };
            let meta_path = run_dir.join(META_FILE);
            if !meta_path.is_file() {
                tracing::debug!(path = %path.display(), "Skipping results without run_meta.json");
                continue;
            }

            let meta: Value =
                serde_json::from_str(&std::fs::read_to_string(&meta_path).with_path(&meta_path)?)?;
            let model_id = meta
                .pointer("/model/id")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            let suite = meta.get("suite").and_then(Value::as_str).unwrap_or("unknown");

            let rows: Vec<Value> = read_jsonl(path)?;
            builder.add_run(model_id, suite, &rows);
        }

        Ok(builder.finish())
    }

    /// Build a leaderboard from in-memory runs: `(model_id, suite, rows)`
    pub fn from_runs<'a>(runs: impl IntoIterator<Item = (&'a str, &'a str, &'a [Value])>) -> Self {
        let mut builder = LeaderboardBuilder::default();
        for (model_id, suite, rows) in runs {
            builder.add_run(model_id, suite, rows);
        }
        builder.finish()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry lookup
    pub fn get(&self, model_id: &str, suite: &str) -> Option<&LeaderboardEntry> {
        self.entries
            .iter()
            .find(|e| e.model_id == model_id && e.suite == suite)
    }
}

#[derive(Default)]
struct LeaderboardBuilder {
    groups: BTreeMap<(String, String), LeaderboardEntry>,
}

impl LeaderboardBuilder {
    /// Fold one run into its group with a case-weighted running average
    fn add_run(&mut self, model_id: &str, suite: &str, rows: &[Value]) {
        if rows.is_empty() {
            return;
        }

        let n = rows.len();
        let total: f64 = rows.iter().map(row_score).sum();
        let passed = rows
            .iter()
            .filter(|r| r.get("pass_fail") == Some(&Value::Bool(true)))
            .count();

        let entry = self
            .groups
            .entry((model_id.to_string(), suite.to_string()))
            .or_insert_with(|| LeaderboardEntry {
                suite: suite.to_string(),
                model_id: model_id.to_string(),
                cases: 0,
                avg_score: 0.0,
                pass_rate: 0.0,
            });

        let prev = entry.cases as f64;
        let merged = (entry.cases + n) as f64;
        entry.avg_score = (entry.avg_score * prev + total) / merged;
        entry.pass_rate = (entry.pass_rate * prev + passed as f64) / merged;
        entry.cases += n;
    }

    /// Sort by suite, then best average score, then best pass rate
    fn finish(self) -> Leaderboard {
        let mut entries: Vec<LeaderboardEntry> = self.groups.into_values().collect();
        entries.sort_by(|a, b| {
            a.suite
                .cmp(&b.suite)
                .then_with(|| b.avg_score.partial_cmp(&a.avg_score).unwrap_or(Ordering::Equal))
                .then_with(|| b.pass_rate.partial_cmp(&a.pass_rate).unwrap_or(Ordering::Equal))
        });
        Leaderboard { entries }
    }
}

/// Score of a persisted row: `scores.score_total` when present, otherwise
/// the sum of all score values. Non-numeric values count as 0.
pub fn row_score(row: &Value) -> f64 {
    let Some(scores) = row.get("scores").and_then(Value::as_object) else {
        return 0.0;
    };
    match scores.get(SCORE_TOTAL) {
        Some(total) => safe_float(total),
        None => scores.values().map(safe_float).sum(),
    }
}

fn safe_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(score: f64, pass: bool) -> Value {
        json!({"scores": {"correctness": score, "score_total": score}, "pass_fail": pass})
    }

    #[test]
    fn test_row_score_conventions() {
        assert_eq!(row_score(&json!({"scores": {"score_total": 1, "a": 5}})), 1.0);
        assert_eq!(row_score(&json!({"scores": {"a": 1, "b": 0.5, "c": "2"}})), 3.5);
        assert_eq!(row_score(&json!({"scores": {"a": "n/a", "b": null, "c": true}})), 1.0);
        assert_eq!(row_score(&json!({"pass_fail": true})), 0.0);
    }

    #[test]
    fn test_weighted_average_across_runs() {
        // run 1: n1=2, t1=4 ; run 2: n2=3, t2=1
        let run1 = vec![row(2.0, true), row(2.0, true)];
        let run2 = vec![row(1.0, true), row(0.0, false), row(0.0, false)];
        let board = Leaderboard::from_runs([
            ("mock", "s", run1.as_slice()),
            ("mock", "s", run2.as_slice()),
        ]);

        let entry = board.get("mock", "s").unwrap();
        assert_eq!(entry.cases, 5);
        assert!((entry.avg_score - 5.0 / 5.0).abs() < 1e-12);
        assert!((entry.pass_rate - 3.0 / 5.0).abs() < 1e-12);

        // Not the mean of per-run averages (2.0 and 0.333)
        assert!((entry.avg_score - (2.0 + 1.0 / 3.0) / 2.0).abs() > 0.1);
    }

    #[test]
    fn test_sorting_and_grouping() {
        let strong = vec![row(2.0, true)];
        let weak = vec![row(1.0, true)];
        let failing = vec![row(1.0, false)];
        let board = Leaderboard::from_runs([
            ("b-model", "zeta", strong.as_slice()),
            ("weak", "alpha", weak.as_slice()),
            ("failing", "alpha", failing.as_slice()),
            ("strong", "alpha", strong.as_slice()),
        ]);

        let order: Vec<(&str, &str)> = board
            .entries
            .iter()
            .map(|e| (e.suite.as_str(), e.model_id.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("alpha", "strong"),
                ("alpha", "weak"),
                ("alpha", "failing"),
                ("zeta", "b-model"),
            ]
        );
    }

    #[test]
    fn test_empty_runs_ignored() {
        let board = Leaderboard::from_runs([("mock", "s", &[][..])]);
        assert!(board.is_empty());
    }

    #[test]
    fn test_missing_runs_dir_is_empty() {
        let board = Leaderboard::from_runs_dir(Path::new("/nonexistent/evalbench/runs")).unwrap();
        assert!(board.is_empty());
    }
}
