//! OpenAI chat completions adapter.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::{ProviderKind, ProviderRequest, ProviderSettings};

pub const API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const TEMPERATURE: f64 = 0.7;
pub const MAX_TOKENS: u32 = 500;

/// OpenAI keeps the system prompt in its own message, separate from the
/// customer's turn.
pub fn build_request(
    system_prompt: &str,
    message: &str,
    settings: &ProviderSettings,
) -> ProviderRequest {
    let key = settings.exposed_key().unwrap_or_default();

    ProviderRequest {
        url: API_URL.to_string(),
        headers: vec![("authorization", format!("Bearer {key}"))],
        body: json!({
            "model": settings.model_for(ProviderKind::OpenAi),
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": message },
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        }),
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

pub fn extract_reply(body: &Value) -> Option<String> {
    let completion: ChatCompletion = serde_json::from_value(body.clone()).ok()?;
    completion
        .choices
        .into_iter()
        .next()?
        .message?
        .content
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;

    use crate::ProviderSettings;

    use super::{build_request, extract_reply, API_URL};

    fn settings() -> ProviderSettings {
        ProviderSettings {
            provider: Some("openai".to_string()),
            api_key: Some(SecretString::from("sk-test".to_string())),
            model: None,
        }
    }

    #[test]
    fn request_carries_system_and_user_roles() {
        let request = build_request("You help shoppers.", "Do you sell candles?", &settings());

        assert_eq!(request.url, API_URL);
        assert_eq!(request.header("authorization"), Some("Bearer sk-test"));
        assert_eq!(request.body["model"], "gpt-3.5-turbo");
        assert_eq!(request.body["temperature"], 0.7);
        assert_eq!(request.body["max_tokens"], 500);

        let messages = request.body["messages"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "You help shoppers.");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Do you sell candles?");
    }

    #[test]
    fn reply_is_read_from_the_first_choice() {
        let body = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  We do!  " } },
                { "message": { "role": "assistant", "content": "ignored" } },
            ]
        });

        assert_eq!(extract_reply(&body), Some("We do!".to_string()));
    }

    #[test]
    fn unexpected_shapes_yield_no_reply() {
        assert_eq!(extract_reply(&json!({})), None);
        assert_eq!(extract_reply(&json!({ "choices": [] })), None);
        assert_eq!(extract_reply(&json!({ "choices": [{}] })), None);
        assert_eq!(
            extract_reply(&json!({ "choices": [{ "message": { "content": "   " } }] })),
            None
        );
        assert_eq!(extract_reply(&json!({ "choices": "nope" })), None);
    }
}
