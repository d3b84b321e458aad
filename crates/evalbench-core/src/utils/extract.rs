//! Extraction of code and SQL from free-form model output

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```(?:python)?\s*(.*?)```").expect("valid code block regex"));

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("valid word regex"));

/// Extract the first fenced code block, or the whole text when there is none.
///
/// The result always ends with a single newline.
pub fn extract_code(text: &str) -> String {
    match CODE_BLOCK_RE.captures(text).and_then(|c| c.get(1)) {
        Some(block) => format!("{}\n", block.as_str().trim()),
        None => format!("{}\n", text.trim()),
    }
}

/// Extract a single SQL statement: the code block (or text) up to and
/// including the first `;`.
pub fn extract_sql(text: &str) -> String {
    let raw = extract_code(text);
    match raw.find(';') {
        Some(semi) => raw[..=semi].trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// Number of Unicode word tokens in `text`
pub fn word_count(text: &str) -> usize {
    WORD_RE.find_iter(text).count()
}
