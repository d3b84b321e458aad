//! Newline-delimited JSON streams

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{BenchError, BenchResult, ResultExt};

/// Read every non-blank line of `path` as one JSON record
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> BenchResult<Vec<T>> {
    let file = File::open(path).with_path(path)?;
    let mut rows = Vec::new();

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_path(path)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = serde_json::from_str(line).map_err(|e| {
            BenchError::serialization_with_context(
                e.to_string(),
                format!("{}:{}", path.display(), index + 1),
            )
        })?;
        rows.push(row);
    }

    Ok(rows)
}

/// Write `rows` to `path`, one compact JSON object per line.
///
/// Parent directories are created; an existing file is replaced.
pub fn write_jsonl<T: Serialize>(path: &Path, rows: &[T]) -> BenchResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_path(parent)?;
    }

    let file = File::create(path).with_path(path)?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n").with_path(path)?;
    }
    writer.flush().with_path(path)?;
    Ok(())
}
