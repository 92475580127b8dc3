//! Google Gemini adapter.
//!
//! Gemini has two API generations in the wild. The stable `gemini-pro`
//! model lives on the v1 endpoint and authenticates with the
//! `x-goog-api-key` header; every other model name is routed to the
//! v1beta endpoint with the key passed as a query parameter.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::request::merged_user_prompt;
use crate::{ProviderKind, ProviderRequest, ProviderSettings};

pub const DEFAULT_MODEL: &str = "gemini-pro";
pub const LEGACY_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1/models/gemini-pro:generateContent";
pub const BETA_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const TEMPERATURE: f64 = 0.7;
pub const MAX_OUTPUT_TOKENS: u32 = 500;

pub fn build_request(
    system_prompt: &str,
    message: &str,
    settings: &ProviderSettings,
) -> ProviderRequest {
    let key = settings.exposed_key().unwrap_or_default();
    let model = settings.model_for(ProviderKind::Gemini);

    let (url, headers) = if model == DEFAULT_MODEL {
        (
            LEGACY_API_URL.to_string(),
            vec![("x-goog-api-key", key.to_string())],
        )
    } else {
        (
            format!("{BETA_API_BASE}/{model}:generateContent?key={key}"),
            Vec::new(),
        )
    };

    ProviderRequest {
        url,
        headers,
        body: json!({
            "contents": [
                {
                    "parts": [
                        { "text": merged_user_prompt(system_prompt, message) },
                    ],
                },
            ],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
            },
        }),
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

pub fn extract_reply(body: &Value) -> Option<String> {
    let response: GenerateResponse = serde_json::from_value(body.clone()).ok()?;
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
