//! OpenAI (and OpenAI-compatible endpoint) adapter
//!
//! Credentials are configurable per model so that several compatible
//! providers can be compared side by side, e.g. DeepSeek:
//!
//! ```yaml
//! - id: deepseek-chat
//!   provider: openai
//!   params:
//!     model: deepseek-chat
//!     api_key_env: DEEPSEEK_API_KEY
//!     base_url: https://api.deepseek.com/v1
//! ```

use async_trait::async_trait;
use serde_json::Value;

use super::chat::{ChatClient, Endpoint};
use crate::error::BenchResult;
use crate::llm::{GenerationResult, ModelAdapter, SamplingParams, Usage};
use crate::registry::{ModelConfig, Params};

const PROVIDER: &str = "openai";

/// Adapter for the OpenAI chat completions API
pub struct OpenAiAdapter {
    client: ChatClient,
}

impl OpenAiAdapter {
    /// Build the adapter, failing fast on a missing `model` or API key
    pub fn from_model(model: &ModelConfig) -> BenchResult<Self> {
        SamplingParams::from_params(&model.params, PROVIDER)?;
        let endpoint = Endpoint::resolve(
            model,
            "OPENAI_API_KEY",
            true,
            "OPENAI_BASE_URL",
            "https://api.openai.com/v1",
        )?;
        let client = ChatClient::new(PROVIDER, endpoint, model)?;
        tracing::debug!(model = %model.id, base_url = %client.base_url(), "OpenAI adapter ready");
        Ok(Self { client })
    }
}

#[async_trait]
impl ModelAdapter for OpenAiAdapter {
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
        Ok(GenerationResult::new(completion.text)
            .with_usage(normalize_openai_usage(&completion.usage))
            .with_latency_ms(completion.latency_ms))
    }
}

/// Map OpenAI's `usage` object onto the common shape; OpenAI reports no cost.
pub fn normalize_openai_usage(usage: &Value) -> Usage {
    Usage {
        input_tokens: usage.get("prompt_tokens").and_then(Value::as_u64),
        output_tokens: usage.get("completion_tokens").and_then(Value::as_u64),
        usd_estimate: None,
    }
}
