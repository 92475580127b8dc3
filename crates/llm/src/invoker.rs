//! Single-attempt LLM invocation.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use clerky_core::domain::context::ConversationContext;

use crate::{LlmOutcome, ProviderKind, ProviderRequest, ProviderSettings, SkipReason};

/// Seam between the chat engine and provider APIs. Implementations must
/// not panic or return errors: every failure mode is a [`LlmOutcome::Skipped`].
#[async_trait]
pub trait LlmInvoker: Send + Sync {
    async fn invoke(
        &self,
        context: &ConversationContext,
        message: &str,
        settings: &ProviderSettings,
    ) -> LlmOutcome;
}

/// Invoker backed by a shared `reqwest` client. One attempt per request,
/// no retries: a slow or broken provider must not stall the chat loop
/// beyond the client timeout.
#[derive(Clone, Debug)]
pub struct HttpLlmInvoker {
    client: reqwest::Client,
}

impl HttpLlmInvoker {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn execute(&self, kind: ProviderKind, request: ProviderRequest) -> LlmOutcome {
        debug!(
            event_name = "llm.request",
            provider = kind.as_str(),
            url = %request.url,
            "calling chat provider"
        );

        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    event_name = "llm.transport_error",
                    provider = kind.as_str(),
                    error = %err,
                    "chat provider unreachable"
                );
                return LlmOutcome::Skipped(SkipReason::Transport(err.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                event_name = "llm.upstream_error",
                provider = kind.as_str(),
                status = status.as_u16(),
                body = log_excerpt(&body),
                "chat provider rejected the request"
            );
            return LlmOutcome::Skipped(SkipReason::UpstreamStatus(status.as_u16()));
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                warn!(
                    event_name = "llm.decode_error",
                    provider = kind.as_str(),
                    error = %err,
                    "chat provider returned unparseable JSON"
                );
                return LlmOutcome::Skipped(SkipReason::MalformedResponse);
            }
        };

        match kind.extract_reply(&body) {
            Some(reply) => LlmOutcome::Answered(reply),
            None => {
                warn!(
                    event_name = "llm.empty_reply",
                    provider = kind.as_str(),
                    "chat provider response carried no reply text"
                );
                LlmOutcome::Skipped(SkipReason::MalformedResponse)
            }
        }
    }
}

#[async_trait]
impl LlmInvoker for HttpLlmInvoker {
    async fn invoke(
        &self,
        context: &ConversationContext,
        message: &str,
        settings: &ProviderSettings,
    ) -> LlmOutcome {
        let (Some(name), Some(_)) = (settings.provider_name(), settings.exposed_key()) else {
            debug!(event_name = "llm.skip", reason = "not_configured");
            return LlmOutcome::Skipped(SkipReason::NotConfigured);
        };

        let Some(kind) = ProviderKind::from_name(name) else {
            debug!(event_name = "llm.skip", reason = "unknown_provider", provider = name);
            return LlmOutcome::Skipped(SkipReason::UnknownProvider(name.to_string()));
        };

        let request = kind.build_request(&context.system_prompt(), message, settings);
        self.execute(kind, request).await
    }
}

fn log_excerpt(body: &str) -> &str {
    const MAX_CHARS: usize = 600;
    match body.char_indices().nth(MAX_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
