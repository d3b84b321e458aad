//! Scrubbing of upstream error bodies before they reach result rows.
//!
//! Error text ends up in `results.jsonl` and the console, so credentials are
//! removed and bodies are capped. Keys are matched by name, not substring:
//! `usage.prompt_tokens` or `max_tokens` stay readable.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::BenchError;

const MAX_ERROR_TEXT_CHARS: usize = 1_024;
const REDACTED: &str = "[REDACTED]";

const SECRET_KEYS: &[&str] = &[
    "api_key",
    "apikey",
    "x_api_key",
    "access_token",
    "refresh_token",
    "id_token",
    "token",
    "secret",
    "client_secret",
    "password",
    "authorization",
    "cookie",
    "set_cookie",
    "private_key",
];

static BEARER_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bBearer\s+[A-Za-z0-9._\-+/=]{8,}").expect("valid bearer token regex")
});

// OpenAI style keys (`sk-...`, `sk-proj-...`) and LiteLLM virtual keys
static PROVIDER_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bsk-[A-Za-z0-9_\-]{8,}").expect("valid provider key regex"));

static KEY_VALUE_SECRET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(api[_-]?key|x-api-key|access[_-]?token|refresh[_-]?token|token|secret|password|authorization)\b\s*[:=]\s*["']?[^"',\s}]+"#,
    )
    .expect("valid key/value secret regex")
});

/// Sanitize an upstream error body: redact secrets and truncate large payloads.
pub fn sanitize_provider_error_text(raw: &str) -> String {
    scrub(raw, None)
}

/// Build the generation error for a non-success chat completion response.
///
/// `api_key` is the credential sent with the request; an upstream that echoes
/// it back has it removed along with the generic patterns.
pub(crate) fn status_error(
    provider: &str,
    status: StatusCode,
    body: &str,
    api_key: Option<&str>,
) -> BenchError {
    BenchError::generation_with_provider(
        format!(
            "{} API error (status {}): {}",
            provider,
            status,
            scrub(body, api_key)
        ),
        provider,
    )
}

fn scrub(raw: &str, known_secret: Option<&str>) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "<empty error response body>".to_string();
    }

    let known_secret = known_secret.filter(|s| !s.is_empty());
    let text = match known_secret {
        Some(secret) => trimmed.replace(secret, REDACTED),
        None => trimmed.to_string(),
    };

    let scrubbed = match serde_json::from_str::<Value>(&text) {
        Ok(mut json) => {
            redact_json_value(&mut json);
            serde_json::to_string(&json).unwrap_or_else(|_| "<unserializable error>".to_string())
        }
        Err(_) => redact_inline_secrets(&text),
    };
    truncate_with_suffix(scrubbed)
}

fn redact_json_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if is_secret_key(key) {
                    *val = Value::String(REDACTED.to_string());
                } else {
                    redact_json_value(val);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_json_value),
        Value::String(s) => *s = redact_inline_secrets(s),
        _ => {}
    }
}

/// Whole-name match after normalizing case and separators; a `_`-joined
/// suffix also counts (`openai_api_key`, `session_token`).
fn is_secret_key(key: &str) -> bool {
    let normalized = key.to_ascii_lowercase().replace(['-', ' ', '.'], "_");
    SECRET_KEYS.iter().any(|name| {
        normalized == *name
            || normalized
                .strip_suffix(name)
                .is_some_and(|prefix| prefix.ends_with('_'))
    })
}

fn redact_inline_secrets(input: &str) -> String {
    let text = BEARER_TOKEN_RE.replace_all(input, "Bearer [REDACTED]");
    let text = KEY_VALUE_SECRET_RE.replace_all(&text, "$1=[REDACTED]");
    PROVIDER_KEY_RE.replace_all(&text, REDACTED).into_owned()
}

fn truncate_with_suffix(input: String) -> String {
    let char_count = input.chars().count();
    if char_count <= MAX_ERROR_TEXT_CHARS {
        return input;
    }

    let truncated: String = input.chars().take(MAX_ERROR_TEXT_CHARS).collect();
    format!(
        "{}... [truncated {} chars]",
        truncated,
        char_count - MAX_ERROR_TEXT_CHARS
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redacts_json_secret_fields() {
        let raw = r#"{"error":{"message":"bad request","api_key":"abc","token":"abc123"}}"#;
        let sanitized = sanitize_provider_error_text(raw);
        assert!(!sanitized.contains("abc123"));
        assert!(!sanitized.contains(r#""abc""#));
        assert!(sanitized.contains("[REDACTED]"));
        assert!(sanitized.contains("bad request"));
    }

    #[test]
    fn test_keeps_usage_counters() {
        let raw = json!({
            "error": {"message": "context length exceeded", "code": "context_length_exceeded"},
            "usage": {"prompt_tokens": 9000, "completion_tokens": 0, "total_tokens": 9000},
            "max_tokens": 1200
        })
        .to_string();
        let value: Value = serde_json::from_str(&sanitize_provider_error_text(&raw)).unwrap();

        assert_eq!(value["usage"]["prompt_tokens"], json!(9000));
        assert_eq!(value["usage"]["total_tokens"], json!(9000));
        assert_eq!(value["max_tokens"], json!(1200));
        assert_eq!(value["error"]["code"], json!("context_length_exceeded"));
    }

    #[test]
    fn test_secret_key_names() {
        for key in [
            "api_key",
            "API-Key",
            "apiKey",
            "x-api-key",
            "openai_api_key",
            "session_token",
            "Authorization",
            "Set-Cookie",
            "client.secret",
        ] {
            assert!(is_secret_key(key), "{} should be redacted", key);
        }
        for key in [
            "prompt_tokens",
            "max_tokens",
            "tokenizer",
            "secretary",
            "password_policy",
            "message",
        ] {
            assert!(!is_secret_key(key), "{} should be kept", key);
        }
    }

    #[test]
    fn test_redacts_nested_arrays() {
        let raw = json!({
            "errors": [
                {"detail": "invalid", "headers": [{"authorization": "Bearer abcdefghijkl"}]},
                {"detail": "key sk-proj-1234567890abcdef was revoked"}
            ]
        })
        .to_string();
        let sanitized = sanitize_provider_error_text(&raw);

        assert!(!sanitized.contains("abcdefghijkl"));
        assert!(!sanitized.contains("sk-proj-1234567890abcdef"));
        assert!(sanitized.contains("was revoked"));
        assert!(sanitized.contains("invalid"));
    }

    #[test]
    fn test_redacts_plain_text_secrets() {
        let raw = "upstream said: Bearer sk-very-secret-token-value is invalid; \
                   api_key=abc123def password: hunter22";
        let sanitized = sanitize_provider_error_text(raw);
        assert!(!sanitized.contains("sk-very-secret-token-value"));
        assert!(!sanitized.contains("abc123def"));
        assert!(!sanitized.contains("hunter22"));
        assert!(sanitized.contains("api_key=[REDACTED]"));
        assert!(sanitized.starts_with("upstream said: Bearer [REDACTED]"));
    }

    #[test]
    fn test_redacts_bare_provider_key() {
        let sanitized = sanitize_provider_error_text("Incorrect API key provided: sk-abcdefgh12345678.");
        assert_eq!(sanitized, "Incorrect API key provided: [REDACTED].");
    }

    #[test]
    fn test_short_sk_words_are_kept() {
        let sanitized = sanitize_provider_error_text("unknown flag sk-x for task-sk-1");
        assert_eq!(sanitized, "unknown flag sk-x for task-sk-1");
    }

    #[test]
    fn test_status_error_scrubs_echoed_key() {
        let err = status_error(
            "litellm",
            StatusCode::UNAUTHORIZED,
            "virtual key local-dev-key-42 is not allowed",
            Some("local-dev-key-42"),
        );

        assert!(err.is_case_scoped());
        assert!(err.message().contains("litellm API error (status 401 Unauthorized)"));
        assert!(err.message().contains("virtual key [REDACTED] is not allowed"));
        assert!(!err.message().contains("local-dev-key-42"));
    }

    #[test]
    fn test_status_error_with_empty_key_leaves_body() {
        let err = status_error("openai", StatusCode::TOO_MANY_REQUESTS, "slow down", Some(""));
        assert!(err.message().ends_with("(status 429 Too Many Requests): slow down"));
    }

    #[test]
    fn test_truncates_long_bodies_on_char_boundaries() {
        let raw = "é".repeat(1_500);
        let sanitized = sanitize_provider_error_text(&raw);
        assert!(sanitized.starts_with(&"é".repeat(1_024)));
        assert!(sanitized.ends_with("... [truncated 476 chars]"));
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(
            sanitize_provider_error_text("  "),
            "<empty error response body>"
        );
    }
}
