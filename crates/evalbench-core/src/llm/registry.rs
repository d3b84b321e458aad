//! Provider tag -> adapter factory registry

use std::collections::BTreeMap;
use std::sync::Arc;

use super::ModelAdapter;
use super::providers::{LiteLlmAdapter, MockAdapter, OpenAiAdapter};
use crate::error::{BenchError, BenchResult};
use crate::registry::ModelConfig;

/// Builds an adapter for a resolved model configuration.
///
/// Factories run once per run, before any case executes, so credential and
/// parameter problems surface as fatal configuration errors.
pub type AdapterFactory =
    Arc<dyn Fn(&ModelConfig) -> BenchResult<Box<dyn ModelAdapter>> + Send + Sync>;

/// Registry of adapter variants keyed by provider tag
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    factories: BTreeMap<String, AdapterFactory>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in `mock`, `openai` and `litellm` adapters
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("mock", |_model| Ok(Box::new(MockAdapter::new())));
        registry.register("openai", |model| {
            Ok(Box::new(OpenAiAdapter::from_model(model)?))
        });
        registry.register("litellm", |model| {
            Ok(Box::new(LiteLlmAdapter::from_model(model)?))
        });
        registry
    }

    /// Register (or replace) a factory for a provider tag
    pub fn register<F>(&mut self, provider: impl Into<String>, factory: F)
    where
        F: Fn(&ModelConfig) -> BenchResult<Box<dyn ModelAdapter>> + Send + Sync + 'static,
    {
        self.factories.insert(provider.into(), Arc::new(factory));
    }

    /// Registered provider tags, sorted
    pub fn providers(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Construct the adapter for a model's provider
    pub fn build(&self, model: &ModelConfig) -> BenchResult<Box<dyn ModelAdapter>> {
        let factory = self.factories.get(&model.provider).ok_or_else(|| {
            BenchError::config_with_context(
                format!("Unsupported provider: {}", model.provider),
                format!("model {}", model.id),
            )
        })?;
        tracing::debug!(model = %model.id, provider = %model.provider, "Constructing adapter");
        factory(model)
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}
