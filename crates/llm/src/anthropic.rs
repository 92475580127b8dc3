//! Anthropic messages adapter.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::request::merged_user_prompt;
use crate::{ProviderKind, ProviderRequest, ProviderSettings};

pub const API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
pub const TEMPERATURE: f64 = 0.7;
pub const MAX_TOKENS: u32 = 500;

/// The system prompt is folded into the single user turn rather than sent
/// as a separate field.
pub fn build_request(
    system_prompt: &str,
    message: &str,
    settings: &ProviderSettings,
) -> ProviderRequest {
    let key = settings.exposed_key().unwrap_or_default();

    ProviderRequest {
        url: API_URL.to_string(),
        headers: vec![
            ("x-api-key", key.to_string()),
            ("anthropic-version", API_VERSION.to_string()),
        ],
        body: json!({
            "model": settings.model_for(ProviderKind::Anthropic),
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
            "messages": [
                { "role": "user", "content": merged_user_prompt(system_prompt, message) },
            ],
        }),
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

pub fn extract_reply(body: &Value) -> Option<String> {
    let response: MessagesResponse = serde_json::from_value(body.clone()).ok()?;
    response
        .content
        .into_iter()
        .next()?
        .text
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
