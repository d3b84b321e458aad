//! Model adapters
//!
//! An adapter turns a system/user prompt pair into generated text from some
//! backend. Adapters are resolved by provider tag through an
//! [`AdapterRegistry`], so new backends can be registered without touching
//! the run orchestrator.

mod params;
pub mod providers;
mod registry;

pub use params::{SamplingParams, read_env};
pub use registry::{AdapterFactory, AdapterRegistry};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BenchResult;
use crate::registry::Params;

/// Token and cost accounting normalized across providers.
///
/// Fields a provider does not report stay `None` and serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub usd_estimate: Option<f64>,
}

/// Output of a single generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Generated text
    pub text: String,

    /// Normalized usage metrics
    pub usage: Usage,

    /// Latency reported by the adapter, if it measured one
    pub latency_ms: Option<u64>,
}

impl GenerationResult {
    /// Create a result with empty usage
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: Usage::default(),
            latency_ms: None,
        }
    }

    /// Set usage metrics
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    /// Set adapter-measured latency
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

/// Capability implemented by every model backend
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Provider tag of this adapter
    fn name(&self) -> &str;

    /// Generate a completion for the prompt pair.
    ///
    /// Per-call failures (network, malformed upstream response) surface as
    /// [`crate::error::BenchError::Generation`].
    async fn generate(
        &self,
        system: &str,
        user: &str,
        params: &Params,
    ) -> BenchResult<GenerationResult>;
}
