//! Model registry
//!
//! The registry document lists named parameter presets and the models that
//! can be benchmarked. Resolution merges a model's preset with its own
//! overrides into an immutable [`ModelConfig`].

mod model;

pub use model::{ModelConfig, ModelEntry, ModelRegistry, Params};
