use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use clerky_catalog::{CatalogError, CatalogGateway, ShopifyCatalog, UnconfiguredCatalog};
use clerky_core::config::{AppConfig, ConfigError, LoadOptions};
use clerky_core::content::{ContentError, ShopContent};
use clerky_engine::ChatEngine;
use clerky_llm::{HttpLlmInvoker, ProviderSettings};

use crate::settings::SettingsStore;
use crate::{chat, health, settings, storefront};

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

/// Shared handler state. Everything in here is cheap to clone; the engine
/// and catalog are behind `Arc`s and the settings store is a shared lock.
#[derive(Clone)]
pub struct AppState {
    pub engine: ChatEngine,
    pub settings: SettingsStore,
    pub catalog: Arc<dyn CatalogGateway>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("catalog client initialization failed: {0}")]
    Catalog(#[source] CatalogError),
    #[error("llm client initialization failed: {0}")]
    LlmClient(#[source] reqwest::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let content = Arc::new(ShopContent::load(config.content.path.as_deref())?);
    info!(
        event_name = "system.bootstrap.content_loaded",
        correlation_id = "bootstrap",
        shop = %content.shop.name,
        "shop content loaded"
    );

    let catalog: Arc<dyn CatalogGateway> =
        match ShopifyCatalog::from_config(&config.catalog).map_err(BootstrapError::Catalog)? {
            Some(catalog) => {
                info!(
                    event_name = "system.bootstrap.catalog_configured",
                    correlation_id = "bootstrap",
                    "storefront catalog client configured"
                );
                Arc::new(catalog)
            }
            None => {
                info!(
                    event_name = "system.bootstrap.catalog_disabled",
                    correlation_id = "bootstrap",
                    "no storefront credentials, product features will degrade"
                );
                Arc::new(UnconfiguredCatalog)
            }
        };

    let invoker = HttpLlmInvoker::new(Duration::from_secs(config.llm.timeout_secs))
        .map_err(BootstrapError::LlmClient)?;
    let settings = SettingsStore::new(ProviderSettings::from_config(&config.llm));
    let engine = ChatEngine::new(content, Arc::clone(&catalog), Arc::new(invoker));

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        provider = config.llm.provider.as_str(),
        "application bootstrap complete"
    );

    Ok(Application { config, state: AppState { engine, settings, catalog } })
}

impl Application {
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(chat::router())
            .merge(settings::router())
            .merge(storefront::router())
            .merge(health::router())
            .with_state(self.state.clone());

        if let Some(cors) = cors_layer(self.config.server.allowed_origin.as_deref()) {
            router = router.layer(cors);
        }

        router
    }
}

/// Builds the CORS layer for the storefront widget origin. No configured
/// origin means no CORS headers at all; an origin that fails header
/// encoding is logged and ignored rather than taking the server down.
fn cors_layer(allowed_origin: Option<&str>) -> Option<CorsLayer> {
    let origin = allowed_origin?;

    if origin == "*" {
        return Some(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));
    }

    match origin.parse::<HeaderValue>() {
        Ok(value) => {
            Some(CorsLayer::new().allow_origin(value).allow_methods(Any).allow_headers(Any))
        }
        Err(error) => {
            warn!(
                event_name = "system.bootstrap.cors_invalid",
                correlation_id = "bootstrap",
                origin,
                error = %error,
                "allowed origin is not a valid header value, CORS disabled"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use clerky_core::config::{ConfigOverrides, LoadOptions, ProviderName};

    use super::{bootstrap, cors_layer};

    fn options(overrides: ConfigOverrides) -> LoadOptions {
        LoadOptions { overrides, ..LoadOptions::default() }
    }

    #[tokio::test]
    async fn bootstrap_succeeds_with_default_configuration() {
        let app = bootstrap(LoadOptions::default()).await.expect("bootstrap should succeed");

        assert_eq!(app.config.server.port, 8080);
        assert!(app.state.settings.snapshot().await.provider.is_none());
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_when_provider_has_no_key() {
        let result = bootstrap(options(ConfigOverrides {
            llm_provider: Some(ProviderName::OpenAi),
            ..ConfigOverrides::default()
        }))
        .await;

        let message = result.err().expect("bootstrap should fail").to_string();
        assert!(message.contains("llm.api_key"));
    }

    #[tokio::test]
    async fn bootstrap_carries_configured_provider_into_settings() {
        let app = bootstrap(options(ConfigOverrides {
            llm_provider: Some(ProviderName::Anthropic),
            llm_api_key: Some("sk-ant-test".to_string()),
            ..ConfigOverrides::default()
        }))
        .await
        .expect("bootstrap should succeed");

        let settings = app.state.settings.snapshot().await;
        assert_eq!(settings.provider.as_deref(), Some("anthropic"));
        assert!(settings.is_configured());
    }

    #[test]
    fn cors_is_disabled_without_an_origin() {
        assert!(cors_layer(None).is_none());
    }

    #[test]
    fn cors_accepts_wildcard_and_concrete_origins() {
        assert!(cors_layer(Some("*")).is_some());
        assert!(cors_layer(Some("https://shop.example.com")).is_some());
    }

    #[test]
    fn unencodable_origin_disables_cors() {
        assert!(cors_layer(Some("https://bad\norigin")).is_none());
    }
}
