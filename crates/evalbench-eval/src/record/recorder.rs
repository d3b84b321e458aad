//! Run directory creation and persistence

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use evalbench_core::utils::{read_jsonl, write_jsonl};
use evalbench_core::{BenchError, BenchResult, ResultExt};

use super::{ResultRow, RunMeta};

/// Run metadata file name
pub const META_FILE: &str = "run_meta.json";

/// Result stream file name
pub const RESULTS_FILE: &str = "results.jsonl";

const ARTIFACTS_DIR: &str = "artifacts";

/// Owns one run directory from creation to the final write
#[derive(Debug, Clone)]
pub struct RunRecorder {
    run_id: String,
    run_dir: PathBuf,
    started_at: DateTime<Utc>,
}

impl RunRecorder {
    /// Create `runs_dir/<date>/<run_id>/artifacts/` for a new run.
    ///
    /// The run id is `<HHMMSSmmm>_<model>_<suite>`; when that directory
    /// already exists a `-2`, `-3`, ... suffix is appended.
    pub fn start(runs_dir: &Path, model_id: &str, suite: &str) -> BenchResult<Self> {
        Self::start_at(runs_dir, model_id, suite, Utc::now())
    }

    /// Same as [`RunRecorder::start`] with an explicit start time
    pub fn start_at(
        runs_dir: &Path,
        model_id: &str,
        suite: &str,
        started_at: DateTime<Utc>,
    ) -> BenchResult<Self> {
        let date_dir = runs_dir.join(started_at.format("%Y-%m-%d").to_string());
        std::fs::create_dir_all(&date_dir).with_path(&date_dir)?;

        let base = format!(
            "{}_{}_{}",
            started_at.format("%H%M%S%3f"),
            sanitize_component(model_id),
            sanitize_component(suite)
        );

        let mut attempt = 1u32;
        loop {
            let run_id = if attempt == 1 {
                base.clone()
            } else {
                format!("{}-{}", base, attempt)
            };
            let run_dir = date_dir.join(&run_id);

            match std::fs::create_dir(&run_dir) {
                Ok(()) => {
                    let artifacts = run_dir.join(ARTIFACTS_DIR);
                    std::fs::create_dir_all(&artifacts).with_path(&artifacts)?;
                    tracing::debug!(run_id = %run_id, dir = %run_dir.display(), "Created run directory");
                    return Ok(Self {
                        run_id,
                        run_dir,
                        started_at,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(BenchError::io_at(e.to_string(), &run_dir)),
            }
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Create and return the scratch directory of one case.
    ///
    /// The directory must not exist yet; a second request for the same
    /// case is an IO error.
    pub fn case_dir(&self, task_id: &str, case_id: &str) -> BenchResult<PathBuf> {
        let task_dir = self
            .run_dir
            .join(ARTIFACTS_DIR)
            .join(sanitize_component(task_id));
        std::fs::create_dir_all(&task_dir).with_path(&task_dir)?;

        let dir = task_dir.join(sanitize_component(case_id));
        std::fs::create_dir(&dir).with_path(&dir)?;
        Ok(dir)
    }

    /// Write `run_meta.json` and `results.jsonl`, rows in the given order
    pub fn persist(&self, meta: &RunMeta, rows: &[ResultRow]) -> BenchResult<PathBuf> {
        let meta_path = self.run_dir.join(META_FILE);
        let json = serde_json::to_string_pretty(meta)?;
        std::fs::write(&meta_path, json).with_path(&meta_path)?;

        write_jsonl(&self.run_dir.join(RESULTS_FILE), rows)?;

        tracing::info!(run_id = %self.run_id, rows = rows.len(), "Run saved");
        Ok(self.run_dir.clone())
    }
}

/// Read a results stream back
pub fn read_results(path: &Path) -> BenchResult<Vec<ResultRow>> {
    read_jsonl(path)
}

/// Read a run's metadata document
pub fn read_meta(path: &Path) -> BenchResult<RunMeta> {
    let content = std::fs::read_to_string(path).with_path(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Check that a task or case id names its artifacts directory as is.
///
/// Ids may use letters, digits, `-`, `_` and inner dots. Anything that would
/// be rewritten on the way to the filesystem is a configuration error, so two
/// distinct ids never share a directory.
pub fn check_path_component(kind: &str, raw: &str) -> BenchResult<()> {
    if sanitize_component(raw) == raw {
        return Ok(());
    }
    Err(BenchError::config(format!(
        "{} '{}' cannot be used as a directory name (allowed: letters, digits, '-', '_', inner '.')",
        kind, raw
    )))
}

/// Make an id usable as a single path component
fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();

    match cleaned.trim_matches('.') {
        "" => "_".to_string(),
        trimmed => trimmed.to_string(),
    }
}
