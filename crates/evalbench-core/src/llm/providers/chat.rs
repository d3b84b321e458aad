//! OpenAI-compatible chat completions client shared by the network adapters

use std::time::{Duration, Instant};

use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::{Value, json};
use tracing::instrument;

use super::error_utils::status_error;
use crate::error::{BenchError, BenchResult};
use crate::llm::{SamplingParams, read_env};
use crate::registry::ModelConfig;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Raw, not yet normalized, chat completion
#[derive(Debug, Clone)]
pub(crate) struct ChatCompletion {
    pub text: String,
    pub usage: Value,
    pub headers: HeaderMap,
    pub latency_ms: u64,
}

/// Endpoint and credential settings resolved when an adapter is built
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Endpoint {
    /// Resolve base URL and credential for a model.
    ///
    /// The API key comes from the variable named by `params.api_key_env`
    /// (falling back to `default_key_env`). When `key_required` is set a
    /// missing key is a configuration error. The base URL is `params.base_url`,
    /// else the variable named by `params.base_url_env` (or `default_url_env`),
    /// else `default_url`. Setting both `base_url` and `base_url_env` is a
    /// configuration error.
    pub fn resolve(
        model: &ModelConfig,
        default_key_env: &str,
        key_required: bool,
        default_url_env: &str,
        default_url: &str,
    ) -> BenchResult<Self> {
        let key_env = model.param_str("api_key_env");
        let key_env_name = key_env.unwrap_or(default_key_env);
        let api_key = read_env(key_env_name);
        if api_key.is_none() && (key_required || key_env.is_some()) {
            return Err(BenchError::config_with_context(
                format!("Missing environment variable {}", key_env_name),
                format!("credential for model {}", model.id),
            ));
        }

        let url_env = model.param_str("base_url_env");
        let literal_url = model.param_str("base_url");
        if let (Some(env), Some(url)) = (url_env, literal_url) {
            return Err(BenchError::config_with_context(
                format!("Set either base_url ({}) or base_url_env ({}), not both", url, env),
                format!("model {}", model.id),
            ));
        }

        let url_env_name = url_env.unwrap_or(default_url_env);
        let base_url = literal_url
            .map(str::to_string)
            .or_else(|| read_env(url_env_name))
            .unwrap_or_else(|| default_url.to_string());

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

/// Thin client for `POST {base_url}/chat/completions`
pub(crate) struct ChatClient {
    provider: &'static str,
    endpoint: Endpoint,
    http: Client,
}

impl ChatClient {
    pub fn new(provider: &'static str, endpoint: Endpoint, model: &ModelConfig) -> BenchResult<Self> {
        let request_timeout = model
            .params
            .get("request_timeout_secs")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .map_err(|e| BenchError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            provider,
            endpoint,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.endpoint.base_url
    }

    #[instrument(skip(self, system, user), fields(provider = self.provider, model = %sampling.model), level = "debug")]
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        sampling: &SamplingParams,
    ) -> BenchResult<ChatCompletion> {
        let url = format!("{}/chat/completions", self.endpoint.base_url);
        let body = json!({
            "model": sampling.model,
            "temperature": sampling.temperature,
            "top_p": sampling.top_p,
            "max_tokens": sampling.max_tokens,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let mut request = self.http.post(&url).json(&body);
        if let Some(api_key) = &self.endpoint.api_key {
            request = request.bearer_auth(api_key);
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|e| {
            BenchError::generation_with_provider(
                format!("{} request failed: {}", self.provider, e),
                self.provider,
            )
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(
                self.provider,
                status,
                &error_text,
                self.endpoint.api_key.as_deref(),
            ));
        }

        let payload: Value = response.json().await.map_err(|e| {
            BenchError::generation_with_provider(
                format!("Failed to parse {} response: {}", self.provider, e),
                self.provider,
            )
        })?;
        let latency_ms = started.elapsed().as_millis() as u64;

        let (text, usage) = parse_chat_payload(&payload)
            .map_err(|msg| BenchError::generation_with_provider(msg, self.provider))?;

        Ok(ChatCompletion {
            text,
            usage,
            headers,
            latency_ms,
        })
    }
}

/// Pull the first choice's content and the raw usage object out of a payload.
///
/// A `null` content is treated as an empty completion.
pub(crate) fn parse_chat_payload(payload: &Value) -> Result<(String, Value), String> {
    let choice = payload
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| "malformed response: no choices".to_string())?;

    let message = choice
        .get("message")
        .ok_or_else(|| "malformed response: choice without message".to_string())?;

    let text = match message.get("content") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => return Err(format!("malformed response: unexpected content {}", other)),
    };

    let usage = payload.get("usage").cloned().unwrap_or(Value::Null);
    Ok((text, usage))
}
