//! Shared text and file helpers

mod extract;
mod hash;
mod jsonl;

pub use extract::{extract_code, extract_sql, word_count};
pub use hash::sha256_hex;
pub use jsonl::{read_jsonl, write_jsonl};
