//! Parameter extraction shared by the network-backed adapters

use serde_json::Value;

use crate::error::{BenchError, BenchResult};
use crate::registry::Params;

const DEFAULT_TEMPERATURE: f64 = 0.0;
const DEFAULT_TOP_P: f64 = 1.0;
const DEFAULT_MAX_TOKENS: u32 = 1200;

/// Sampling parameters sent with every request
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl SamplingParams {
    /// Extract sampling parameters, applying the fixed defaults.
    ///
    /// `model` is required; a missing or blank value is a configuration
    /// error. Numbers may also be given as numeric strings.
    pub fn from_params(params: &Params, provider: &str) -> BenchResult<Self> {
        let model = params
            .get("model")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                BenchError::config(format!("params.model is required for the {} adapter", provider))
            })?;

        Ok(Self {
            model: model.to_string(),
            temperature: number(params, "temperature")?.unwrap_or(DEFAULT_TEMPERATURE),
            top_p: number(params, "top_p")?.unwrap_or(DEFAULT_TOP_P),
            max_tokens: token_limit(params, "max_tokens")?.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }
}

fn number(params: &Params, key: &str) -> BenchResult<Option<f64>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            BenchError::config(format!("params.{} must be numeric, got '{}'", key, s))
        }),
        Some(other) => Err(BenchError::config(format!(
            "params.{} must be numeric, got {}",
            key, other
        ))),
    }
}

/// A positive whole number that fits the request field
fn token_limit(params: &Params, key: &str) -> BenchResult<Option<u32>> {
    let invalid = |shown: String| {
        BenchError::config(format!("params.{} must be a positive integer, got {}", key, shown))
    };
    let value = match params.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_u64().ok_or_else(|| invalid(n.to_string()))?,
        Some(Value::String(s)) => s.trim().parse::<u64>().map_err(|_| invalid(format!("'{}'", s)))?,
        Some(other) => return Err(invalid(other.to_string())),
    };
    match u32::try_from(value) {
        Ok(limit) if limit > 0 => Ok(Some(limit)),
        _ => Err(invalid(value.to_string())),
    }
}

/// Read an environment variable, treating blank values as unset
pub fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
