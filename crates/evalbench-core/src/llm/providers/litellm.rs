//! LiteLLM proxy adapter
//!
//! Targets a LiteLLM proxy, which exposes every provider it routes to
//! behind an OpenAI-compatible endpoint and reports request cost.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;

use super::chat::{ChatClient, Endpoint};
use crate::error::BenchResult;
use crate::llm::{GenerationResult, ModelAdapter, SamplingParams, Usage};
use crate::registry::{ModelConfig, Params};

const PROVIDER: &str = "litellm";
const COST_HEADER: &str = "x-litellm-response-cost";

/// Adapter for a LiteLLM proxy
pub struct LiteLlmAdapter {
    client: ChatClient,
}

impl LiteLlmAdapter {
    /// Build the adapter.
    ///
    /// The proxy key is optional unless the model names an `api_key_env`
    /// explicitly, in which case that variable must be set.
    pub fn from_model(model: &ModelConfig) -> BenchResult<Self> {
        SamplingParams::from_params(&model.params, PROVIDER)?;
        let endpoint = Endpoint::resolve(
            model,
            "LITELLM_API_KEY",
            false,
            "LITELLM_BASE_URL",
            "http://localhost:4000",
        )?;
        let client = ChatClient::new(PROVIDER, endpoint, model)?;
        tracing::debug!(model = %model.id, base_url = %client.base_url(), "LiteLLM adapter ready");
        Ok(Self { client })
    }
}

#[async_trait]
impl ModelAdapter for LiteLlmAdapter {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(
        &self,
        system: &str,
        user: &str,
        params: &Params,
    ) -> BenchResult<GenerationResult> {
        let sampling = SamplingParams::from_params(params, PROVIDER)?;
        let completion = self.client.complete(system, user, &sampling).await?;
        let header_cost = header_cost(&completion.headers);
        Ok(GenerationResult::new(completion.text)
            .with_usage(normalize_litellm_usage(&completion.usage, header_cost))
            .with_latency_ms(completion.latency_ms))
    }
}

fn header_cost(headers: &HeaderMap) -> Option<f64> {
    headers
        .get(COST_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
}

/// Map LiteLLM's usage onto the common shape.
///
/// Cost is taken from `usage.total_cost` when present, else from the
/// proxy's response cost header.
pub fn normalize_litellm_usage(usage: &Value, header_cost: Option<f64>) -> Usage {
    Usage {
        input_tokens: usage.get("prompt_tokens").and_then(Value::as_u64),
        output_tokens: usage.get("completion_tokens").and_then(Value::as_u64),
        usd_estimate: usage
            .get("total_cost")
            .and_then(Value::as_f64)
            .or(header_cost),
    }
}
