//! The orchestrator that ties the two answering tiers together.

use std::sync::Arc;

use tracing::debug;

use clerky_catalog::CatalogGateway;
use clerky_core::{ChatError, ChatMessage, ChatReply, ShopContent};
use clerky_llm::{LlmInvoker, LlmOutcome, ProviderSettings};

use crate::classifier::IntentClassifier;
use crate::composer::ResponseComposer;
use crate::context::ContextBuilder;

/// Handles one customer message end to end.
///
/// The provider tier runs only when settings are configured, and its only
/// two outcomes are an answer or a skip. A skip of any kind drops through
/// to classification and composition, which always produce text.
#[derive(Clone)]
pub struct ChatEngine {
    classifier: IntentClassifier,
    context: ContextBuilder,
    composer: ResponseComposer,
    invoker: Arc<dyn LlmInvoker>,
}

impl ChatEngine {
    pub fn new(
        content: Arc<ShopContent>,
        catalog: Arc<dyn CatalogGateway>,
        invoker: Arc<dyn LlmInvoker>,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(Arc::clone(&content)),
            context: ContextBuilder::new(Arc::clone(&content), Arc::clone(&catalog)),
            composer: ResponseComposer::new(content, catalog),
            invoker,
        }
    }

    pub async fn handle(
        &self,
        message: &str,
        settings: &ProviderSettings,
    ) -> Result<ChatReply, ChatError> {
        let message = ChatMessage::parse(message)?;

        if settings.is_configured() {
            let context = self.context.build(message.text()).await;
            match self.invoker.invoke(&context, message.text(), settings).await {
                LlmOutcome::Answered(text) => {
                    debug!(event_name = "chat.llm_answered");
                    return Ok(ChatReply::llm(text));
                }
                LlmOutcome::Skipped(reason) => {
                    debug!(
                        event_name = "chat.llm_skipped",
                        reason = reason.code(),
                        "falling back to rule-based reply"
                    );
                }
            }
        }

        let intent = self.classifier.classify(message.text());
        let text = self.composer.compose(intent, message.text()).await;
        debug!(event_name = "chat.rules_reply", intent = intent.as_str());
        Ok(ChatReply::rules(text))
    }
}
