use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use clerky_catalog::{CatalogError, CatalogGateway, CONNECTIVITY_PROBE_LIMIT};
use clerky_llm::ProviderSettings;

use crate::bootstrap::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub provider: HealthCheck,
    pub checked_at: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Overall readiness follows the catalog probe alone. A missing provider
/// or missing catalog credentials are reported as `skipped`: the service
/// still answers every chat from the rules tier.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = catalog_check(state.catalog.as_ref()).await;
    let provider = provider_check(&state.settings.snapshot().await);
    let ready = catalog.status != "degraded";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "clerky-server runtime initialized".to_string(),
        },
        catalog,
        provider,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn catalog_check(catalog: &dyn CatalogGateway) -> HealthCheck {
    match catalog.list_products(CONNECTIVITY_PROBE_LIMIT, None).await {
        Ok(products) => HealthCheck {
            status: "ready",
            detail: format!("catalog probe returned {} products", products.len()),
        },
        Err(CatalogError::NotConfigured) => HealthCheck {
            status: "skipped",
            detail: "catalog credentials not configured".to_string(),
        },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("catalog probe failed: {error}") }
        }
    }
}

fn provider_check(settings: &ProviderSettings) -> HealthCheck {
    match settings.provider_name() {
        Some(name) if settings.is_configured() => {
            HealthCheck { status: "ready", detail: format!("provider {name} configured") }
        }
        Some(name) => HealthCheck {
            status: "degraded",
            detail: format!("provider {name} is missing an api key"),
        },
        None => HealthCheck { status: "skipped", detail: "no provider configured".to_string() },
    }
}
