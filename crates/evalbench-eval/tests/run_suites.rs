//! End-to-end runs of the shipped suites with the mock adapter

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use evalbench_core::{
    AdapterRegistry, BenchError, BenchResult, GenerationResult, ModelAdapter, ModelRegistry,
    Params,
};
use evalbench_eval::record::{META_FILE, RESULTS_FILE, read_meta, read_results};
use evalbench_eval::{
    Case, CaseProgress, EvaluationResult, Evaluator, EvaluatorRegistry, FailurePolicy, HarnessConfig,
    RunOrchestrator,
};
use tempfile::TempDir;

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn python_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn orchestrator(runs: &TempDir, configure: impl FnOnce(HarnessConfig) -> HarnessConfig) -> RunOrchestrator {
    let config = configure(HarnessConfig::new(repo_root()).with_runs_dir(runs.path()));
    RunOrchestrator::from_config(config).unwrap()
}

#[tokio::test]
async fn test_programming_general_palindrome_passes() {
    if !python_available() {
        return;
    }
    let runs = TempDir::new().unwrap();
    let outcome = orchestrator(&runs, |c| c)
        .run("mock", "programming_general")
        .await
        .unwrap();

    assert_eq!(outcome.rows.len(), 1);
    let row = &outcome.rows[0];
    assert_eq!(row.task_id, "pg_001_function_implementation");
    assert_eq!(row.case_id, "1");
    assert!(row.pass_fail, "notes: {}", row.notes);
    assert_eq!(row.scores.get("score_total"), Some(&2.0));
    assert!(row.error.is_none());

    let artifacts = outcome
        .run_dir
        .join("artifacts/pg_001_function_implementation/1");
    assert!(artifacts.join("solution.py").is_file());
    assert!(artifacts.join("test_output.txt").is_file());
}

#[tokio::test]
async fn test_sql_task_passes() {
    let runs = TempDir::new().unwrap();
    let outcome = orchestrator(&runs, |c| c)
        .run("mock", "data_programming")
        .await
        .unwrap();

    assert_eq!(outcome.rows.len(), 1);
    let row = &outcome.rows[0];
    assert!(row.pass_fail, "notes: {}", row.notes);
    assert_eq!(row.scores.get("score_total"), Some(&2.0));

    let got = std::fs::read_to_string(
        outcome.run_dir.join("artifacts/dp_001_sql_query/1/got.json"),
    )
    .unwrap();
    assert_eq!(got, r#"[["corporativo",25.0],["premium",100.0],["prepago",20.0]]"#);
}

#[tokio::test]
async fn test_formal_email_scores_all_criteria() {
    let runs = TempDir::new().unwrap();
    let outcome = orchestrator(&runs, |c| c)
        .run("mock", "communication_tone")
        .await
        .unwrap();

    assert_eq!(outcome.rows.len(), 2);
    for row in &outcome.rows {
        assert!(row.pass_fail);
        assert_eq!(row.scores.get("score_total"), Some(&2.0));
        assert_eq!(row.scores.get("tone_formality"), Some(&1.0));
        assert!(row.notes.contains("fecha=true"), "notes: {}", row.notes);
    }
}

#[tokio::test]
async fn test_run_is_recorded_and_round_trips() {
    let runs = TempDir::new().unwrap();
    let outcome = orchestrator(&runs, |c| c)
        .run("mock", "communication_tone")
        .await
        .unwrap();

    assert!(outcome.run_id.ends_with("_mock_communication_tone"));
    assert_eq!(outcome.run_dir.parent().unwrap().parent().unwrap(), runs.path());

    let rows = read_results(&outcome.run_dir.join(RESULTS_FILE)).unwrap();
    assert_eq!(rows, outcome.rows);
    let case_ids: Vec<&str> = rows.iter().map(|r| r.case_id.as_str()).collect();
    assert_eq!(case_ids, vec!["1", "2"]);

    let meta = read_meta(&outcome.run_dir.join(META_FILE)).unwrap();
    assert_eq!(meta.run_id, outcome.run_id);
    assert_eq!(meta.suite, "communication_tone");
    assert_eq!(meta.model.id, "mock");
    assert_eq!(meta.model.params.get("max_tokens"), Some(&serde_json::json!(1200)));
    assert_eq!(meta.tasks.len(), 1);
    assert_eq!(meta.tasks[0].id, "ct_001_formal_email");
    assert_eq!(meta.tasks[0].cases, 2);
    assert!(meta.aggregates.is_empty());
}

#[tokio::test]
async fn test_input_hash_is_stable_across_runs() {
    let runs = TempDir::new().unwrap();
    let orchestrator = orchestrator(&runs, |c| c);
    let first = orchestrator.run("mock", "communication_tone").await.unwrap();
    let second = orchestrator.run("mock", "communication_tone").await.unwrap();

    assert_ne!(first.run_dir, second.run_dir);
    for (a, b) in first.rows.iter().zip(&second.rows) {
        assert_eq!(a.input_hash, b.input_hash);
        assert_eq!(
            a.input_hash.as_deref(),
            Some(evalbench_core::utils::sha256_hex(a.prompt.as_deref().unwrap()).as_str())
        );
    }
    assert_ne!(first.rows[0].input_hash, first.rows[1].input_hash);
}

#[tokio::test]
async fn test_case_limit_and_task_filter() {
    let runs = TempDir::new().unwrap();
    let limited = orchestrator(&runs, |c| c.with_max_cases(1))
        .run("mock", "communication_tone")
        .await
        .unwrap();
    assert_eq!(limited.rows.len(), 1);
    assert_eq!(limited.rows[0].case_id, "1");

    let filtered = orchestrator(&runs, |c| c.with_task_ids(vec!["other_task".to_string()]))
        .run("mock", "communication_tone")
        .await
        .unwrap();
    assert!(filtered.rows.is_empty());
    let meta = read_meta(&filtered.run_dir.join(META_FILE)).unwrap();
    assert!(meta.tasks.is_empty());
}

#[tokio::test]
async fn test_progress_callback_sees_every_case() {
    let runs = TempDir::new().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut orchestrator = orchestrator(&runs, |c| c);
    let sink = Arc::clone(&seen);
    orchestrator.set_progress_callback(Box::new(move |p: &CaseProgress| {
        sink.lock()
            .unwrap()
            .push(format!("{}/{} {}/{}", p.current, p.total, p.task_id, p.case_id));
    }));

    orchestrator.run("mock", "communication_tone").await.unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "1/2 ct_001_formal_email/1".to_string(),
            "2/2 ct_001_formal_email/2".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_unknown_model_fails_before_run_dir() {
    let runs = TempDir::new().unwrap();
    let err = orchestrator(&runs, |c| c)
        .run("no-such-model", "communication_tone")
        .await
        .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(std::fs::read_dir(runs.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_unknown_suite_fails_before_run_dir() {
    let runs = TempDir::new().unwrap();
    let err = orchestrator(&runs, |c| c)
        .run("mock", "no_such_suite")
        .await
        .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(std::fs::read_dir(runs.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_unsupported_provider_is_configuration_error() {
    let runs = TempDir::new().unwrap();
    let registry = ModelRegistry::from_yaml("models:\n  - id: x\n    provider: carrier-pigeon\n").unwrap();
    let config = HarnessConfig::new(repo_root()).with_runs_dir(runs.path());
    let err = RunOrchestrator::new(config, registry)
        .run("x", "communication_tone")
        .await
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(err.message().contains("Unsupported provider"));
}

/// Fails for any prompt mentioning `poison`, otherwise answers like the mock
struct FlakyAdapter {
    poison: &'static str,
}

#[async_trait]
impl ModelAdapter for FlakyAdapter {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn generate(
        &self,
        system: &str,
        user: &str,
        params: &Params,
    ) -> BenchResult<GenerationResult> {
        if user.contains(self.poison) {
            return Err(BenchError::generation_with_provider("upstream returned 502", "flaky"));
        }
        evalbench_core::llm::providers::MockAdapter::new()
            .generate(system, user, params)
            .await
    }
}

fn flaky_orchestrator(runs: &TempDir, policy: FailurePolicy) -> RunOrchestrator {
    let registry = ModelRegistry::from_yaml("models:\n  - id: flaky\n    provider: flaky\n").unwrap();
    let mut adapters = AdapterRegistry::with_builtins();
    adapters.register("flaky", |_model| {
        Ok(Box::new(FlakyAdapter {
            poison: "2024-04-05",
        }))
    });
    let config = HarnessConfig::new(repo_root())
        .with_runs_dir(runs.path())
        .with_failure_policy(policy);
    RunOrchestrator::new(config, registry).with_adapters(adapters)
}

#[tokio::test]
async fn test_isolate_policy_records_failed_row_and_continues() {
    let runs = TempDir::new().unwrap();
    let outcome = flaky_orchestrator(&runs, FailurePolicy::Isolate)
        .run("flaky", "communication_tone")
        .await
        .unwrap();

    assert_eq!(outcome.rows.len(), 2);
    assert!(outcome.rows[0].pass_fail);
    assert!(outcome.rows[0].error.is_none());

    let failed = &outcome.rows[1];
    assert!(!failed.pass_fail);
    assert_eq!(failed.scores.get("score_total"), Some(&0.0));
    assert!(failed.error.as_deref().unwrap().contains("upstream returned 502"));
    assert!(failed.prompt.is_some());
    assert!(failed.raw_output.is_none());
    assert_eq!(outcome.failed_rows(), 1);

    let persisted = read_results(&outcome.run_dir.join(RESULTS_FILE)).unwrap();
    assert_eq!(persisted, outcome.rows);
}

#[tokio::test]
async fn test_abort_policy_propagates_first_failure() {
    let runs = TempDir::new().unwrap();
    let err = flaky_orchestrator(&runs, FailurePolicy::Abort)
        .run("flaky", "communication_tone")
        .await
        .unwrap_err();

    match err {
        BenchError::Generation { provider, .. } => assert_eq!(provider.as_deref(), Some("flaky")),
        other => panic!("unexpected error: {other:?}"),
    }

    // The run directory exists but nothing was persisted
    let results: Vec<PathBuf> = walk_files(runs.path())
        .into_iter()
        .filter(|p| p.ends_with(RESULTS_FILE) || p.ends_with(META_FILE))
        .collect();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_template_error_is_isolated() {
    let root = TempDir::new().unwrap();
    let task_dir = root.path().join("suites/broken/tasks/t_001");
    std::fs::create_dir_all(&task_dir).unwrap();
    std::fs::write(
        task_dir.join("task.yml"),
        "id: t_001\nname: Broken\nprompt: prompt.txt\ncases: cases.jsonl\nevaluator:\n  type: formal_email\n",
    )
    .unwrap();
    std::fs::write(task_dir.join("prompt.txt"), "Redacta un correo. Cordial.\nNueva fecha: {new_date}\n").unwrap();
    std::fs::write(
        task_dir.join("cases.jsonl"),
        "{\"case_id\": \"a\"}\n{\"case_id\": \"b\", \"new_date\": \"2024-05-01\"}\n",
    )
    .unwrap();

    let registry = ModelRegistry::from_yaml("models:\n  - id: mock\n    provider: mock\n").unwrap();
    let config = HarnessConfig::new(root.path());
    let outcome = RunOrchestrator::new(config, registry)
        .run("mock", "broken")
        .await
        .unwrap();

    assert_eq!(outcome.rows.len(), 2);
    let failed = &outcome.rows[0];
    assert!(failed.error.as_deref().unwrap().starts_with("Template error"));
    assert!(failed.prompt.is_none());
    assert!(failed.input_hash.is_none());
    assert!(outcome.rows[1].error.is_none());
    assert!(outcome.rows[1].pass_fail);
    assert!(outcome.run_dir.starts_with(root.path().join("runs")));
}

/// Write `suites/<suite>/tasks/<dir>/` under `root` with a one-line prompt
fn write_task(root: &Path, suite: &str, dir: &str, task_yml: &str, cases: &str) {
    let task_dir = root.join("suites").join(suite).join("tasks").join(dir);
    std::fs::create_dir_all(&task_dir).unwrap();
    std::fs::write(task_dir.join("task.yml"), task_yml).unwrap();
    std::fs::write(task_dir.join("prompt.txt"), "Resume: {topic}\n").unwrap();
    std::fs::write(task_dir.join("cases.jsonl"), cases).unwrap();
}

fn mock_registry() -> ModelRegistry {
    ModelRegistry::from_yaml("models:\n  - id: mock\n    provider: mock\n").unwrap()
}

#[tokio::test]
async fn test_task_id_unusable_as_directory_fails_before_run_dir() {
    let root = TempDir::new().unwrap();
    write_task(
        root.path(),
        "unsafe",
        "t_001",
        "id: ../t_001\nprompt: prompt.txt\ncases: cases.jsonl\nevaluator:\n  type: formal_email\n",
        "{\"case_id\": \"1\", \"topic\": \"x\"}\n",
    );

    let err = RunOrchestrator::new(HarnessConfig::new(root.path()), mock_registry())
        .run("mock", "unsafe")
        .await
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(err.message().contains("directory name"));
    assert!(!root.path().join("runs").exists());
}

/// Scores the number of words the model produced
struct WordCountEvaluator;

#[async_trait]
impl Evaluator for WordCountEvaluator {
    fn name(&self) -> &str {
        "word_count"
    }

    async fn evaluate(
        &self,
        _case: &Case,
        model_output: &str,
        workdir: &Path,
    ) -> BenchResult<EvaluationResult> {
        assert!(workdir.is_dir());
        let words = evalbench_core::utils::word_count(model_output) as f64;
        Ok(EvaluationResult::new(words > 0.0).with_score("words", words))
    }
}

#[tokio::test]
async fn test_custom_evaluator_registration() {
    let root = TempDir::new().unwrap();
    write_task(
        root.path(),
        "custom",
        "t_001",
        "id: t_001\nprompt: prompt.txt\ncases: cases.jsonl\nevaluator:\n  type: word_count\n",
        "{\"case_id\": \"1\", \"topic\": \"clima\"}\n",
    );

    // Unknown to the built-in registry
    let builtin = RunOrchestrator::new(HarnessConfig::new(root.path()), mock_registry());
    assert!(builtin.run("mock", "custom").await.unwrap_err().is_configuration());

    let mut evaluators = EvaluatorRegistry::with_builtins();
    evaluators.register("word_count", |_spec, _ctx| Ok(Box::new(WordCountEvaluator)));
    let outcome = RunOrchestrator::new(HarnessConfig::new(root.path()), mock_registry())
        .with_evaluators(evaluators)
        .run("mock", "custom")
        .await
        .unwrap();

    assert_eq!(outcome.rows.len(), 1);
    let row = &outcome.rows[0];
    assert!(row.pass_fail);
    assert!(row.scores.get("words").copied().unwrap_or_default() > 0.0);
    // No score_total: the row total falls back to the sum of scores
    assert_eq!(row.score_total(), row.scores["words"]);
}

fn walk_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}
