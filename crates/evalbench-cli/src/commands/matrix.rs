//! Matrix command: one suite across several models

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;

use super::{aggregate, run};
use crate::args::RunOptions;
use crate::console::CliConsole;

/// Run `suite` for each model in turn. A failing model does not stop the
/// remaining ones; the exit code reports whether any of them failed.
pub async fn execute(
    root: &Path,
    suite: &str,
    models: &[String],
    options: &RunOptions,
    aggregate_after: bool,
) -> Result<ExitCode> {
    let console = CliConsole::new();
    let mut failed: Vec<&str> = Vec::new();

    for model in models {
        if let Err(e) = run::execute(root, model, suite, options).await {
            tracing::error!(model = %model, suite = %suite, error = %e, "Model run failed");
            console.error(&format!("{:#}", e));
            failed.push(model);
        }
    }

    if aggregate_after {
        aggregate::execute(root, options.runs_dir.as_deref(), None, None)?;
    }

    println!();
    if failed.is_empty() {
        console.success(&format!("{} model(s) completed '{}'", models.len(), suite));
        Ok(ExitCode::SUCCESS)
    } else {
        console.error(&format!(
            "{} of {} model(s) failed: {}",
            failed.len(),
            models.len(),
            failed.join(", ")
        ));
        Ok(ExitCode::FAILURE)
    }
}
