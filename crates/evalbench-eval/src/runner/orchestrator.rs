//! Run orchestrator
//!
//! Resolves the model, plans every selected task of a suite, then drives
//! the cases one at a time through generation and evaluation before the
//! run is recorded.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use evalbench_core::utils::sha256_hex;
use evalbench_core::{
    AdapterRegistry, BenchError, BenchResult, ModelAdapter, ModelConfig, ModelRegistry,
};
use tracing::instrument;

use super::{FailurePolicy, HarnessConfig};
use crate::evaluators::{EvalContext, Evaluator, EvaluatorRegistry};
use crate::record::{
    ResultRow, RunMeta, RunRecorder, TaskSummary, check_path_component, source_revision,
};
use crate::tasks::{Case, PromptTemplate, TaskConfig, TaskLoader};

/// Callback invoked before each case is processed
pub type ProgressCallback = Box<dyn Fn(&CaseProgress) + Send + Sync>;

/// Progress update during a run
#[derive(Debug, Clone)]
pub struct CaseProgress {
    /// 1-based position of the case in the run
    pub current: usize,
    /// Total number of cases in the run
    pub total: usize,
    pub task_id: String,
    pub case_id: String,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: String,
    pub run_dir: PathBuf,
    pub rows: Vec<ResultRow>,
}

impl RunOutcome {
    /// Rows that failed with an isolated error
    pub fn failed_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.error.is_some()).count()
    }

    /// Rows whose evaluation passed
    pub fn passed_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.pass_fail).count()
    }
}

/// A task ready to run: config, template, cases and evaluator all loaded
struct PlannedTask {
    config: TaskConfig,
    template: PromptTemplate,
    cases: Vec<Case>,
    evaluator: Box<dyn Evaluator>,
}

/// Drives a model through a suite
pub struct RunOrchestrator {
    config: HarnessConfig,
    registry: ModelRegistry,
    adapters: AdapterRegistry,
    evaluators: EvaluatorRegistry,
    loader: TaskLoader,
    progress_callback: Option<ProgressCallback>,
}

impl RunOrchestrator {
    /// Create an orchestrator with the built-in adapters and evaluators
    pub fn new(config: HarnessConfig, registry: ModelRegistry) -> Self {
        let loader = TaskLoader::new(&config.suites_dir);
        Self {
            config,
            registry,
            adapters: AdapterRegistry::with_builtins(),
            evaluators: EvaluatorRegistry::with_builtins(),
            loader,
            progress_callback: None,
        }
    }

    /// Create an orchestrator, loading the registry named by the config
    pub fn from_config(config: HarnessConfig) -> BenchResult<Self> {
        let registry = ModelRegistry::load(&config.registry_path)?;
        Ok(Self::new(config, registry))
    }

    /// Replace the adapter registry
    pub fn with_adapters(mut self, adapters: AdapterRegistry) -> Self {
        self.adapters = adapters;
        self
    }

    /// Replace the evaluator registry
    pub fn with_evaluators(mut self, evaluators: EvaluatorRegistry) -> Self {
        self.evaluators = evaluators;
        self
    }

    /// Set progress callback
    pub fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.progress_callback = Some(callback);
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run every selected task of `suite` with `model_id`.
    ///
    /// Configuration problems surface before the run directory is created.
    /// Case failures follow the configured [`FailurePolicy`].
    #[instrument(skip(self), fields(policy = %self.config.failure_policy))]
    pub async fn run(&self, model_id: &str, suite: &str) -> BenchResult<RunOutcome> {
        let model = self.registry.resolve(model_id)?;
        let adapter = self.adapters.build(&model)?;
        let plan = self.plan(suite)?;

        let total: usize = plan.iter().map(|t| t.cases.len()).sum();
        tracing::info!(
            model = %model.id,
            provider = %model.provider,
            suite = %suite,
            tasks = plan.len(),
            cases = total,
            "Starting run"
        );

        let recorder = RunRecorder::start(&self.config.runs_dir, &model.id, suite)?;
        let mut rows = Vec::with_capacity(total);
        let mut current = 0;

        for task in &plan {
            tracing::info!(task_id = %task.config.id, cases = task.cases.len(), "Running task");

            for case in &task.cases {
                current += 1;
                if let Some(callback) = &self.progress_callback {
                    callback(&CaseProgress {
                        current,
                        total,
                        task_id: task.config.id.clone(),
                        case_id: case.case_id.clone(),
                    });
                }

                let mut row = ResultRow::new(suite, &task.config.id, &case.case_id);
                match self
                    .run_case(adapter.as_ref(), &model, task, case, &recorder, &mut row)
                    .await
                {
                    Ok(()) => {}
                    Err(e) if e.is_fatal() || self.config.failure_policy == FailurePolicy::Abort => {
                        tracing::error!(
                            task_id = %task.config.id,
                            case_id = %case.case_id,
                            error = %e,
                            "Run aborted"
                        );
                        return Err(e);
                    }
                    Err(e) => {
                        tracing::warn!(
                            task_id = %task.config.id,
                            case_id = %case.case_id,
                            code = e.error_code(),
                            error = %e,
                            "Case failed, recording failed row"
                        );
                        row.mark_failed(&e);
                    }
                }
                rows.push(row);
            }
        }

        let meta = RunMeta {
            run_id: recorder.run_id().to_string(),
            timestamp_utc: recorder.started_at(),
            source_revision: source_revision(&self.config.root),
            model: model.clone(),
            suite: suite.to_string(),
            tasks: plan
                .iter()
                .map(|t| TaskSummary {
                    id: t.config.id.clone(),
                    name: t.config.name.clone(),
                    cases: t.cases.len(),
                })
                .collect(),
            aggregates: Default::default(),
        };
        let run_dir = recorder.persist(&meta, &rows)?;

        Ok(RunOutcome {
            run_id: recorder.run_id().to_string(),
            run_dir,
            rows,
        })
    }

    /// Load everything the run needs up front, in discovery order
    fn plan(&self, suite: &str) -> BenchResult<Vec<PlannedTask>> {
        let mut plan: Vec<PlannedTask> = Vec::new();

        for task_dir in self.loader.discover(suite)? {
            let config = self.loader.load(&task_dir)?;
            if !self.config.selects_task(&config.id) {
                tracing::debug!(task_id = %config.id, "Skipping task not in filter");
                continue;
            }
            check_path_component("task id", &config.id).map_err(|e| {
                BenchError::config_with_context(e.message().to_string(), task_dir.display().to_string())
            })?;
            if plan.iter().any(|t| t.config.id == config.id) {
                return Err(BenchError::config_with_context(
                    format!("Duplicate task id '{}'", config.id),
                    task_dir.display().to_string(),
                ));
            }

            let template = self.loader.prompt_template(&task_dir, &config)?;
            let cases = self
                .loader
                .cases(&task_dir, &config, self.config.max_cases)?;
            let evaluator = self
                .evaluators
                .build(&config.evaluator, &self.eval_context(&task_dir))?;

            plan.push(PlannedTask {
                config,
                template,
                cases,
                evaluator,
            });
        }

        Ok(plan)
    }

    fn eval_context(&self, task_dir: &Path) -> EvalContext {
        EvalContext::new(task_dir)
            .with_python(self.config.python.clone())
            .with_timeout(self.config.evaluator_timeout_secs.map(Duration::from_secs))
    }

    /// Process one case, filling `row` as each stage completes so a failed
    /// case still records how far it got.
    async fn run_case(
        &self,
        adapter: &dyn ModelAdapter,
        model: &ModelConfig,
        task: &PlannedTask,
        case: &Case,
        recorder: &RunRecorder,
        row: &mut ResultRow,
    ) -> BenchResult<()> {
        let prompt = task.template.render(&case.fields)?;
        row.input_hash = Some(sha256_hex(&prompt));
        row.prompt = Some(prompt);
        let prompt = row.prompt.as_deref().unwrap_or_default();

        let started = Instant::now();
        let generation = adapter
            .generate(&self.config.system_prompt, prompt, &model.params)
            .await?;
        let measured_ms = started.elapsed().as_millis() as u64;

        row.latency_ms = Some(generation.latency_ms.unwrap_or(measured_ms));
        row.usage = generation.usage;
        row.raw_output = Some(generation.text);
        let output = row.raw_output.as_deref().unwrap_or_default();

        let workdir = recorder.case_dir(&task.config.id, &case.case_id)?;
        let evaluation = task.evaluator.evaluate(case, output, &workdir).await?;

        tracing::debug!(
            task_id = %task.config.id,
            case_id = %case.case_id,
            pass = evaluation.pass_fail,
            score = evaluation.score_total(),
            latency_ms = row.latency_ms,
            "Case evaluated"
        );
        row.apply_evaluation(evaluation);
        Ok(())
    }
}

impl std::fmt::Debug for RunOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOrchestrator")
            .field("config", &self.config)
            .field("adapters", &self.adapters)
            .field("evaluators", &self.evaluators)
            .finish()
    }
}
