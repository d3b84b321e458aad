//! Evalbench Core Library
//!
//! This crate provides the shared building blocks of the Evalbench harness:
//! the error taxonomy, the model registry and its resolver, the model adapter
//! capability with its built-in backends, and small text/file utilities.

pub mod error;
pub mod llm;
pub mod registry;
pub mod utils;

// Re-export commonly used types
pub use error::{BenchError, BenchResult, ResultExt};
pub use llm::{AdapterRegistry, GenerationResult, ModelAdapter, SamplingParams, Usage};
pub use registry::{ModelConfig, ModelEntry, ModelRegistry, Params};
