//! Core error type and result alias

use thiserror::Error;

/// Result type alias for Evalbench operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Main error type for Evalbench
#[derive(Error, Debug, Clone)]
pub enum BenchError {
    /// Unknown model id, unsupported provider, missing suite directory,
    /// missing adapter parameter or credential
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        context: Option<String>,
    },

    /// A case does not provide a field referenced by the prompt template
    #[error("Template error: {message}")]
    Template {
        message: String,
        field: Option<String>,
    },

    /// Model adapter failure (network, malformed upstream response)
    #[error("Generation error: {message}")]
    Generation {
        message: String,
        provider: Option<String>,
    },

    /// Evaluator failure that was not degraded into a failing score
    #[error("Evaluation error: {message}")]
    Evaluation { message: String },

    /// Filesystem errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// JSON / YAML encoding or decoding errors
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        context: Option<String>,
    },
}

impl BenchError {
    /// Stable code for programmatic handling and log fields
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "BENCH_CONFIGURATION",
            Self::Template { .. } => "BENCH_TEMPLATE",
            Self::Generation { .. } => "BENCH_GENERATION",
            Self::Evaluation { .. } => "BENCH_EVALUATION",
            Self::Io { .. } => "BENCH_IO",
            Self::Serialization { .. } => "BENCH_SERIALIZATION",
        }
    }

    /// Human-readable message without the category prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Configuration { message, .. }
            | Self::Template { message, .. }
            | Self::Generation { message, .. }
            | Self::Evaluation { message, .. }
            | Self::Io { message, .. }
            | Self::Serialization { message, .. } => message,
        }
    }

    /// Whether the error belongs to a single case and may be isolated into
    /// a failed result row instead of aborting the run.
    ///
    /// Configuration, IO and serialization problems concern the run as a
    /// whole and are never isolated.
    pub fn is_case_scoped(&self) -> bool {
        matches!(
            self,
            Self::Template { .. } | Self::Generation { .. } | Self::Evaluation { .. }
        )
    }

    /// Whether the error must terminate the run regardless of failure policy
    pub fn is_fatal(&self) -> bool {
        !self.is_case_scoped()
    }

    /// Whether this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Extension trait for attaching a path to foreign errors
pub trait ResultExt<T> {
    /// Convert the error into an IO error tagged with a path
    fn with_path(self, path: &std::path::Path) -> BenchResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn with_path(self, path: &std::path::Path) -> BenchResult<T> {
        self.map_err(|e| BenchError::io_at(e.to_string(), path))
    }
}
