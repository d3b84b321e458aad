//! Content hashing

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the UTF-8 bytes of `text`
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
