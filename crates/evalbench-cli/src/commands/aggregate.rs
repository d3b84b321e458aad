//! Aggregate command: leaderboard reports from recorded runs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use evalbench_eval::Leaderboard;

use crate::console::CliConsole;

/// Aggregate every run under the runs directory and write CSV and Markdown
/// reports, defaulting to `<root>/runs` and `<root>/reports/`.
pub fn execute(
    root: &Path,
    runs_dir: Option<&Path>,
    out_csv: Option<&Path>,
    out_md: Option<&Path>,
) -> Result<Leaderboard> {
    let console = CliConsole::new();
    let runs_dir = runs_dir.map_or_else(|| root.join("runs"), Path::to_path_buf);
    let out_csv = out_csv.map_or_else(|| report_path(root, "leaderboard.csv"), Path::to_path_buf);
    let out_md = out_md.map_or_else(|| report_path(root, "leaderboard.md"), Path::to_path_buf);

    let board = Leaderboard::from_runs_dir(&runs_dir)
        .with_context(|| format!("Failed to aggregate runs in {}", runs_dir.display()))?;
    if board.is_empty() {
        console.warn(&format!("No recorded runs found in {}", runs_dir.display()));
    }
    board.save(&out_csv, &out_md)?;

    board.write_markdown(std::io::stdout().lock())?;
    println!();
    console.success(&format!("CSV: {}", out_csv.display()));
    console.success(&format!("MD:  {}", out_md.display()));

    Ok(board)
}

fn report_path(root: &Path, file: &str) -> PathBuf {
    root.join("reports").join(file)
}
