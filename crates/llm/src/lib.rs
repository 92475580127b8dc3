//! Chat-completion providers behind one narrow surface.
//!
//! Every provider is a pair of pure functions: `build_request` prepares the
//! URL, headers, and JSON body, and `extract_reply` digs the answer out of
//! the response JSON. [`invoker::HttpLlmInvoker`] is the only place that
//! touches the network, and it never fails a chat request: anything that
//! goes wrong becomes [`LlmOutcome::Skipped`] and the caller falls back to
//! rule-based replies.

pub mod anthropic;
pub mod gemini;
pub mod invoker;
pub mod openai;
pub mod request;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;

use clerky_core::config::LlmConfig;

pub use invoker::{HttpLlmInvoker, LlmInvoker};
pub use request::ProviderRequest;

/// The closed set of providers the invoker can call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
}

impl ProviderKind {
    /// Tolerant lookup: any name outside the closed set yields `None`,
    /// which the invoker reports as a skip rather than an error.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "anthropic" => Some(Self::Anthropic),
            "gemini" => Some(Self::Gemini),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => openai::DEFAULT_MODEL,
            Self::Anthropic => anthropic::DEFAULT_MODEL,
            Self::Gemini => gemini::DEFAULT_MODEL,
        }
    }

    pub fn build_request(
        &self,
        system_prompt: &str,
        message: &str,
        settings: &ProviderSettings,
    ) -> ProviderRequest {
        match self {
            Self::OpenAi => openai::build_request(system_prompt, message, settings),
            Self::Anthropic => anthropic::build_request(system_prompt, message, settings),
            Self::Gemini => gemini::build_request(system_prompt, message, settings),
        }
    }

    pub fn extract_reply(&self, body: &Value) -> Option<String> {
        match self {
            Self::OpenAi => openai::extract_reply(body),
            Self::Anthropic => anthropic::extract_reply(body),
            Self::Gemini => gemini::extract_reply(body),
        }
    }
}

/// Provider settings as they exist at the moment a request is handled.
/// Callers snapshot these per request, so runtime updates apply from the
/// next message onward.
#[derive(Clone, Debug, Default)]
pub struct ProviderSettings {
    pub provider: Option<String>,
    pub api_key: Option<SecretString>,
    pub model: Option<String>,
}

impl ProviderSettings {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            provider: config
                .provider
                .is_enabled()
                .then(|| config.provider.as_str().to_string()),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Both a provider name and an API key must be present for the LLM tier
    /// to run at all.
    pub fn is_configured(&self) -> bool {
        self.provider_name().is_some() && self.exposed_key().is_some()
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.provider
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("none"))
    }

    pub(crate) fn exposed_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret().trim())
            .filter(|key| !key.is_empty())
    }

    pub fn model_for(&self, kind: ProviderKind) -> String {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| kind.default_model().to_string())
    }
}

/// What came back from the LLM tier. `Skipped` is not an error: it tells
/// the engine to compose a rule-based reply instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LlmOutcome {
    Answered(String),
    Skipped(SkipReason),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SkipReason {
    #[error("no provider is configured")]
    NotConfigured,
    #[error("unknown provider `{0}`")]
    UnknownProvider(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("provider returned status {0}")]
    UpstreamStatus(u16),
    #[error("provider response carried no reply text")]
    MalformedResponse,
}

impl SkipReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::UnknownProvider(_) => "unknown_provider",
            Self::Transport(_) => "transport",
            Self::UpstreamStatus(_) => "upstream_status",
            Self::MalformedResponse => "malformed_response",
        }
    }
}
