//! Run command: one model through one suite

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use evalbench_eval::{CaseProgress, HarnessConfig, RunOrchestrator, RunOutcome};

use crate::args::RunOptions;
use crate::console::CliConsole;

/// Build the harness configuration for `root` with command line overrides
pub fn harness_config(root: &Path, options: &RunOptions) -> HarnessConfig {
    let mut config = HarnessConfig::new(root).with_task_ids(options.tasks.clone());

    if let Some(runs_dir) = &options.runs_dir {
        config = config.with_runs_dir(runs_dir);
    }
    if let Some(max_cases) = options.max_cases {
        config = config.with_max_cases(max_cases);
    }
    if let Some(system) = &options.system {
        config = config.with_system_prompt(system);
    }
    if let Some(policy) = options.on_case_error {
        config = config.with_failure_policy(policy);
    }
    if let Some(python) = &options.python {
        config = config.with_python(python);
    }
    if let Some(timeout) = options.timeout {
        config = config.with_evaluator_timeout(timeout);
    }

    config
}

/// Execute the run command
pub async fn execute(
    root: &Path,
    model: &str,
    suite: &str,
    options: &RunOptions,
) -> Result<RunOutcome> {
    let console = CliConsole::new();
    let config = harness_config(root, options);

    let mut orchestrator = RunOrchestrator::from_config(config)
        .with_context(|| format!("Failed to prepare run under {}", root.display()))?;
    orchestrator.set_progress_callback(Box::new(|progress: &CaseProgress| {
        println!(
            "[{}/{}] {}/{}",
            progress.current, progress.total, progress.task_id, progress.case_id
        );
    }));

    console.print_header(&format!("{} / {}", suite, model));
    console.info(&format!(
        "Recording under {}",
        orchestrator.config().runs_dir.display()
    ));
    let outcome = orchestrator
        .run(model, suite)
        .await
        .with_context(|| format!("Run of '{}' on '{}' failed", model, suite))?;

    print_summary(&outcome);

    let failed = outcome.failed_rows();
    if failed > 0 {
        console.warn(&format!("{} case(s) failed with an error", failed));
    }
    console.success(&format!("Run saved in: {}", outcome.run_dir.display()));

    Ok(outcome)
}

/// Per-task table: cases, passed, average score
fn print_summary(outcome: &RunOutcome) {
    let mut tasks: BTreeMap<&str, (usize, usize, f64)> = BTreeMap::new();
    for row in &outcome.rows {
        let entry = tasks.entry(row.task_id.as_str()).or_default();
        entry.0 += 1;
        entry.1 += usize::from(row.pass_fail);
        entry.2 += row.score_total();
    }

    println!();
    println!(
        "{:<36} {:>6} {:>7} {:>10}",
        "Task".bold(),
        "Cases".bold(),
        "Passed".bold(),
        "Avg score".bold()
    );
    println!("{:-<62}", "");
    for (task_id, (cases, passed, total)) in &tasks {
        let avg = if *cases > 0 { total / *cases as f64 } else { 0.0 };
        let passed_str = format!("{}", passed);
        let passed_str = if passed == cases {
            passed_str.green()
        } else {
            passed_str.yellow()
        };
        println!("{:<36} {:>6} {:>7} {:>10.3}", task_id, cases, passed_str, avg);
    }
    println!();
    println!(
        "Run {}: {} case(s), {} passed",
        outcome.run_id.bold(),
        outcome.rows.len(),
        outcome.passed_rows()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalbench_eval::FailurePolicy;
    use std::path::PathBuf;

    #[test]
    fn test_harness_config_defaults() {
        let config = harness_config(Path::new("/srv/bench"), &RunOptions::default());
        assert_eq!(config.runs_dir, PathBuf::from("/srv/bench/runs"));
        assert_eq!(config.failure_policy, FailurePolicy::Isolate);
        assert!(config.task_ids.is_empty());
        assert!(config.evaluator_timeout_secs.is_none());
    }

    #[test]
    fn test_harness_config_overrides() {
        let options = RunOptions {
            tasks: vec!["pg_001_function_implementation".to_string()],
            max_cases: Some(2),
            system: Some("Be brief.".to_string()),
            on_case_error: Some(FailurePolicy::Abort),
            runs_dir: Some(PathBuf::from("/tmp/runs")),
            python: Some("python3.12".to_string()),
            timeout: Some(5),
        };
        let config = harness_config(Path::new("/srv/bench"), &options);

        assert_eq!(config.runs_dir, PathBuf::from("/tmp/runs"));
        assert_eq!(config.suites_dir, PathBuf::from("/srv/bench/suites"));
        assert_eq!(config.max_cases, Some(2));
        assert_eq!(config.system_prompt, "Be brief.");
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.python, "python3.12");
        assert_eq!(config.evaluator_timeout_secs, Some(5));
        assert!(config.selects_task("pg_001_function_implementation"));
        assert!(!config.selects_task("pg_002"));
    }
}
