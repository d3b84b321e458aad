//! Run recording
//!
//! A run lives in `runs/<YYYY-MM-DD>/<run_id>/` with `run_meta.json`,
//! `results.jsonl` and `artifacts/<task_id>/<case_id>/`.

mod recorder;
mod revision;
mod types;

pub use recorder::{
    META_FILE, RESULTS_FILE, RunRecorder, check_path_component, read_meta, read_results,
};
pub use revision::source_revision;
pub use types::{ResultRow, RunMeta, TaskSummary};
