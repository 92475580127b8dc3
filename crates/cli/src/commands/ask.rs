use std::sync::Arc;
use std::time::Duration;

use clerky_catalog::{CatalogGateway, ShopifyCatalog, UnconfiguredCatalog};
use clerky_core::config::{AppConfig, LoadOptions};
use clerky_core::content::ShopContent;
use clerky_core::errors::ChatError;
use clerky_engine::ChatEngine;
use clerky_llm::{HttpLlmInvoker, ProviderSettings};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct AskOutcome {
    command: &'static str,
    status: &'static str,
    source: &'static str,
    reply: String,
}

/// Runs one question through the same pipeline the server uses. Offline by
/// default: without provider and catalog credentials the reply comes from
/// the rule-based tier.
pub fn run(message: &str, json_output: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("ask", "config_validation", error.to_string(), 2);
        }
    };

    let content = match ShopContent::load(config.content.path.as_deref()) {
        Ok(content) => Arc::new(content),
        Err(error) => {
            return CommandResult::failure("ask", "content_load", error.to_string(), 2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                1,
            );
        }
    };

    let catalog: Arc<dyn CatalogGateway> = match ShopifyCatalog::from_config(&config.catalog) {
        Ok(Some(catalog)) => Arc::new(catalog),
        Ok(None) => Arc::new(UnconfiguredCatalog),
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "catalog_init",
                format!("failed to initialize catalog client: {error}"),
                1,
            );
        }
    };

    let invoker = match HttpLlmInvoker::new(Duration::from_secs(config.llm.timeout_secs)) {
        Ok(invoker) => Arc::new(invoker),
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "llm_client_init",
                format!("failed to initialize provider client: {error}"),
                1,
            );
        }
    };

    let settings = ProviderSettings::from_config(&config.llm);
    let engine = ChatEngine::new(content, catalog, invoker);

    match runtime.block_on(engine.handle(message, &settings)) {
        Ok(reply) => {
            let output = if json_output {
                let outcome = AskOutcome {
                    command: "ask",
                    status: "ok",
                    source: reply.source.as_str(),
                    reply: reply.text,
                };
                serde_json::to_string(&outcome).unwrap_or_else(|error| {
                    format!(
                        "{{\"command\":\"ask\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
                        error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
                    )
                })
            } else {
                reply.text
            };
            CommandResult { exit_code: 0, output }
        }
        Err(error) => {
            let (error_class, exit_code) = match &error {
                ChatError::EmptyMessage => ("empty_message", 2),
                ChatError::Internal(_) => ("internal", 1),
            };
            CommandResult::failure("ask", error_class, error.to_string(), exit_code)
        }
    }
}
