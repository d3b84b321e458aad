//! Registry document types and model resolution

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BenchError, BenchResult, ResultExt};

/// Free-form adapter parameters (`model`, `temperature`, `api_key_env`, ...)
pub type Params = serde_json::Map<String, Value>;

/// One entry of the registry's `models` list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Identifier used on the command line and in run ids
    pub id: String,

    /// Adapter tag (`mock`, `openai`, `litellm`, ...)
    pub provider: String,

    /// Optional preset the parameters start from
    #[serde(default)]
    pub preset: Option<String>,

    /// Model-specific overrides applied on top of the preset
    #[serde(default)]
    pub params: Option<Params>,
}

/// Fully resolved model configuration, one per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: String,
    pub provider: String,
    pub params: Params,
}

impl ModelConfig {
    /// Create a model configuration directly (mostly useful in tests)
    pub fn new(id: impl Into<String>, provider: impl Into<String>, params: Params) -> Self {
        Self {
            id: id.into(),
            provider: provider.into(),
            params,
        }
    }

    /// String parameter lookup
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Parsed registry document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelRegistry {
    /// Named parameter presets
    #[serde(default)]
    pub presets: BTreeMap<String, Params>,

    /// Models in file order
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

impl ModelRegistry {
    /// Load a registry from a YAML file
    pub fn load(path: impl AsRef<Path>) -> BenchResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).with_path(path)?;
        Self::from_yaml(&content).map_err(|e| {
            BenchError::config_with_context(
                format!("Invalid model registry: {}", e.message()),
                path.display().to_string(),
            )
        })
    }

    /// Parse a registry from a YAML string
    pub fn from_yaml(content: &str) -> BenchResult<Self> {
        // An empty document parses as null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Model ids in registry order
    pub fn list_models(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.id.as_str()).collect()
    }

    /// Look up a model entry by id
    pub fn entry(&self, model_id: &str) -> Option<&ModelEntry> {
        self.models.iter().find(|m| m.id == model_id)
    }

    /// Resolve a model id into a concrete configuration.
    ///
    /// Parameters start from the referenced preset (if any) and the model's
    /// own `params` overwrite them key by key. The merge is shallow: a nested
    /// mapping in the overrides replaces the preset's value wholesale.
    pub fn resolve(&self, model_id: &str) -> BenchResult<ModelConfig> {
        let entry = self.entry(model_id).ok_or_else(|| {
            BenchError::config(format!("Model not found in registry: {}", model_id))
        })?;

        let mut params = match entry.preset.as_deref() {
            Some(name) => self.presets.get(name).cloned().ok_or_else(|| {
                BenchError::config_with_context(
                    format!("Unknown preset '{}'", name),
                    format!("referenced by model {}", model_id),
                )
            })?,
            None => Params::new(),
        };

        if let Some(overrides) = &entry.params {
            for (key, value) in overrides {
                params.insert(key.clone(), value.clone());
            }
        }

        tracing::debug!(model = %model_id, provider = %entry.provider, "Resolved model configuration");

        Ok(ModelConfig {
            id: entry.id.clone(),
            provider: entry.provider.clone(),
            params,
        })
    }
}
