//! Runtime provider settings.
//!
//! `GET /api/settings` shows the current provider configuration with the
//! API key masked; `PUT /api/settings` changes it without a restart. The
//! chat endpoint snapshots the store per request, so an update applies
//! from the next message onward.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use clerky_llm::{ProviderKind, ProviderSettings};

use crate::bootstrap::AppState;
use crate::chat::ApiError;

#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<RwLock<ProviderSettings>>,
}

impl SettingsStore {
    pub fn new(initial: ProviderSettings) -> Self {
        Self { inner: Arc::new(RwLock::new(initial)) }
    }

    pub async fn snapshot(&self) -> ProviderSettings {
        self.inner.read().await.clone()
    }

    /// Applies the fields present in the update. An empty string (or
    /// `none` for the provider) clears a field; an absent field leaves it
    /// untouched.
    pub async fn apply(&self, update: SettingsUpdate) -> ProviderSettings {
        let mut settings = self.inner.write().await;

        if let Some(provider) = update.provider {
            let trimmed = provider.trim();
            settings.provider = (!trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("none"))
                .then(|| trimmed.to_lowercase());
        }
        if let Some(api_key) = update.api_key {
            let trimmed = api_key.trim();
            settings.api_key =
                (!trimmed.is_empty()).then(|| SecretString::from(trimmed.to_string()));
        }
        if let Some(model) = update.model {
            let trimmed = model.trim();
            settings.model = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }

        settings.clone()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    pub provider: Option<String>,
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SettingsView {
    pub provider: Option<String>,
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    pub model: Option<String>,
}

impl SettingsView {
    fn of(settings: &ProviderSettings) -> Self {
        Self {
            provider: settings.provider_name().map(str::to_string),
            api_key: settings.api_key.as_ref().map(|key| mask_key(key.expose_secret())),
            model: settings.model.clone(),
        }
    }
}

/// Keys render as the first 7 and last 4 characters around `***`. Short
/// keys mask entirely so the two visible ends can never overlap.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }

    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}***{tail}")
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/settings", get(get_settings).put(put_settings))
}

pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsView> {
    Json(SettingsView::of(&state.settings.snapshot().await))
}

pub async fn put_settings(
    State(state): State<AppState>,
    payload: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<SettingsView>, (StatusCode, Json<ApiError>)> {
    let Json(update) = payload.map_err(|_| {
        ApiError::new(StatusCode::BAD_REQUEST, "Settings payload could not be read.")
    })?;

    if let Some(provider) = update.provider.as_deref() {
        let trimmed = provider.trim();
        let recognized = trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("none")
            || ProviderKind::from_name(trimmed).is_some();
        if !recognized {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                format!("unsupported provider `{trimmed}` (expected openai|anthropic|gemini|none)"),
            ));
        }
    }

    let applied = state.settings.apply(update).await;
    info!(
        event_name = "settings.updated",
        provider = applied.provider_name().unwrap_or("none"),
        has_key = applied.api_key.is_some(),
        "provider settings updated"
    );

    Ok(Json(SettingsView::of(&applied)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::Json;
    use secrecy::SecretString;

    use clerky_catalog::UnconfiguredCatalog;
    use clerky_core::ShopContent;
    use clerky_engine::ChatEngine;
    use clerky_llm::{HttpLlmInvoker, ProviderSettings};

    use crate::bootstrap::AppState;

    use super::{get_settings, mask_key, put_settings, SettingsStore, SettingsUpdate};

    fn test_state(initial: ProviderSettings) -> AppState {
        let catalog = Arc::new(UnconfiguredCatalog);
        let invoker = HttpLlmInvoker::new(std::time::Duration::from_secs(1))
            .expect("client should build");

        AppState {
            engine: ChatEngine::new(
                Arc::new(ShopContent::default()),
                catalog.clone(),
                Arc::new(invoker),
            ),
            settings: SettingsStore::new(initial),
            catalog,
        }
    }

    fn configured() -> ProviderSettings {
        ProviderSettings {
            provider: Some("openai".to_string()),
            api_key: Some(SecretString::from("sk-proj-abcdefghijkl-wxyz".to_string())),
            model: Some("gpt-4o".to_string()),
        }
    }

    #[test]
    fn masking_shows_only_the_key_ends() {
        assert_eq!(mask_key("sk-proj-abcdefghijkl-wxyz"), "sk-proj***wxyz");
        assert_eq!(mask_key("short"), "***");
        assert_eq!(mask_key("elevenchars"), "***");
        assert_eq!(mask_key(""), "***");
    }

    #[tokio::test]
    async fn get_returns_a_masked_view() {
        let Json(view) = get_settings(State(test_state(configured()))).await;

        assert_eq!(view.provider.as_deref(), Some("openai"));
        assert_eq!(view.api_key.as_deref(), Some("sk-proj***wxyz"));
        assert_eq!(view.model.as_deref(), Some("gpt-4o"));
    }

    #[tokio::test]
    async fn put_applies_only_the_fields_present() {
        let state = test_state(configured());

        let Json(view) = put_settings(
            State(state.clone()),
            Ok(Json(SettingsUpdate {
                provider: Some("gemini".to_string()),
                api_key: None,
                model: None,
            })),
        )
        .await
        .expect("update should apply");

        assert_eq!(view.provider.as_deref(), Some("gemini"));
        assert_eq!(view.model.as_deref(), Some("gpt-4o"));

        let snapshot = state.settings.snapshot().await;
        assert_eq!(snapshot.provider.as_deref(), Some("gemini"));
        assert!(snapshot.is_configured());
    }

    #[tokio::test]
    async fn put_none_clears_the_provider() {
        let state = test_state(configured());

        let Json(view) = put_settings(
            State(state.clone()),
            Ok(Json(SettingsUpdate {
                provider: Some("none".to_string()),
                api_key: Some(String::new()),
                model: None,
            })),
        )
        .await
        .expect("update should apply");

        assert!(view.provider.is_none());
        assert!(view.api_key.is_none());
        assert!(!state.settings.snapshot().await.is_configured());
    }

    #[tokio::test]
    async fn put_rejects_an_unknown_provider() {
        let state = test_state(ProviderSettings::default());

        let result = put_settings(
            State(state.clone()),
            Ok(Json(SettingsUpdate {
                provider: Some("mistral".to_string()),
                api_key: None,
                model: None,
            })),
        )
        .await;

        let (status, Json(body)) = result.expect_err("unknown provider should be rejected");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.message.contains("mistral"));
        assert!(state.settings.snapshot().await.provider.is_none());
    }

    #[tokio::test]
    async fn updates_apply_to_later_snapshots() {
        let store = SettingsStore::new(ProviderSettings::default());
        let before = store.snapshot().await;

        store
            .apply(SettingsUpdate {
                provider: Some("anthropic".to_string()),
                api_key: Some("sk-ant-key".to_string()),
                model: None,
            })
            .await;

        assert!(!before.is_configured());
        assert!(store.snapshot().await.is_configured());
    }
}
