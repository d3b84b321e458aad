//! CSV and Markdown leaderboard reports

use std::io::Write;
use std::path::Path;

use evalbench_core::{BenchError, BenchResult, ResultExt};

use super::Leaderboard;

const CSV_HEADER: [&str; 5] = ["suite", "model_id", "cases", "avg_score", "pass_rate"];

impl Leaderboard {
    /// Write the leaderboard as CSV: `suite,model_id,cases,avg_score,pass_rate`.
    ///
    /// Floats use their shortest round-trip form (`0.5`, `1.0`).
    pub fn write_csv<W: Write>(&self, w: W) -> BenchResult<()> {
        let mut writer = csv::Writer::from_writer(w);
        writer.write_record(CSV_HEADER).map_err(csv_error)?;

        for entry in &self.entries {
            let record = [
                entry.suite.clone(),
                entry.model_id.clone(),
                entry.cases.to_string(),
                format!("{:?}", entry.avg_score),
                format!("{:?}", entry.pass_rate),
            ];
            writer.write_record(&record).map_err(csv_error)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write the leaderboard as a Markdown table
    pub fn write_markdown<W: Write>(&self, mut w: W) -> BenchResult<()> {
        writeln!(w, "# Leaderboard")?;
        writeln!(w)?;
        writeln!(w, "| Suite | Model | Cases | Avg score | Pass rate |")?;
        writeln!(w, "|---|---:|---:|---:|---:|")?;

        for entry in &self.entries {
            writeln!(
                w,
                "| {} | {} | {} | {:.3} | {:.3} |",
                entry.suite, entry.model_id, entry.cases, entry.avg_score, entry.pass_rate
            )?;
        }

        Ok(())
    }

    /// Save both reports, creating parent directories
    pub fn save(&self, csv_path: &Path, md_path: &Path) -> BenchResult<()> {
        let mut csv = Vec::new();
        self.write_csv(&mut csv)?;
        write_file(csv_path, &csv)?;

        let mut md = Vec::new();
        self.write_markdown(&mut md)?;
        write_file(md_path, &md)?;

        tracing::info!(
            entries = self.entries.len(),
            csv = %csv_path.display(),
            markdown = %md_path.display(),
            "Leaderboard written"
        );
        Ok(())
    }
}

fn write_file(path: &Path, content: &[u8]) -> BenchResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_path(parent)?;
    }
    std::fs::write(path, content).with_path(path)
}

fn csv_error(error: csv::Error) -> BenchError {
    BenchError::serialization_with_context(error.to_string(), "csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::LeaderboardEntry;
    use tempfile::TempDir;

    fn board() -> Leaderboard {
        Leaderboard {
            entries: vec![
                LeaderboardEntry {
                    suite: "data_programming".to_string(),
                    model_id: "mock".to_string(),
                    cases: 3,
                    avg_score: 2.0 / 3.0,
                    pass_rate: 1.0,
                },
                LeaderboardEntry {
                    suite: "data_programming".to_string(),
                    model_id: "vendor \"x\", v2".to_string(),
                    cases: 1,
                    avg_score: 0.0,
                    pass_rate: 0.0,
                },
            ],
        }
    }

    #[test]
    fn test_csv_output() {
        let mut out = Vec::new();
        board().write_csv(&mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "suite,model_id,cases,avg_score,pass_rate");
        assert_eq!(lines[1], "data_programming,mock,3,0.6666666666666666,1.0");
        assert_eq!(lines[2], "data_programming,\"vendor \"\"x\"\", v2\",1,0.0,0.0");
    }

    #[test]
    fn test_markdown_output() {
        let mut out = Vec::new();
        board().write_markdown(&mut out).unwrap();
        let md = String::from_utf8(out).unwrap();
        assert!(md.starts_with("# Leaderboard\n"));
        assert!(md.contains("| Suite | Model | Cases | Avg score | Pass rate |"));
        assert!(md.contains("| data_programming | mock | 3 | 0.667 | 1.000 |"));
    }

    #[test]
    fn test_save_creates_directories() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("reports/leaderboard.csv");
        let md = dir.path().join("reports/leaderboard.md");
        Leaderboard::default().save(&csv, &md).unwrap();

        assert_eq!(
            std::fs::read_to_string(&csv).unwrap(),
            "suite,model_id,cases,avg_score,pass_rate\n"
        );
        assert!(std::fs::read_to_string(&md).unwrap().contains("|---|"));
    }
}
