//! Built-in adapter implementations

mod chat;
mod error_utils;
mod litellm;
mod mock;
mod openai;

pub use error_utils::sanitize_provider_error_text;
pub use litellm::{LiteLlmAdapter, normalize_litellm_usage};
pub use mock::MockAdapter;
pub use openai::{OpenAiAdapter, normalize_openai_usage};
