//! From trait implementations for BenchError conversions

use super::types::BenchError;

impl From<std::io::Error> for BenchError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization_with_context(error.to_string(), "json")
    }
}

impl From<serde_yaml::Error> for BenchError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::serialization_with_context(error.to_string(), "yaml")
    }
}
