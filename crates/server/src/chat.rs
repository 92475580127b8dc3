//! The customer chat endpoint.
//!
//! `POST /api/chat` takes `{"message": "..."}` and returns `{"reply": "..."}`.
//! Failures use one error shape, `{"error": {"message", "status"}}`, so the
//! storefront widget can render any of them the same way.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::bootstrap::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub message: String,
    pub status: u16,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
        (
            status,
            Json(ApiError {
                error: ApiErrorDetail { message: message.into(), status: status.as_u16() },
            }),
        )
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/chat", post(chat))
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ApiError>)> {
    let correlation_id = Uuid::new_v4().simple().to_string();

    // An unreadable body gets the same answer as a missing message.
    let Json(request) = payload.map_err(|rejection| {
        warn!(
            event_name = "chat.bad_payload",
            correlation_id = %correlation_id,
            error = %rejection,
            "chat payload could not be read"
        );
        ApiError::new(StatusCode::BAD_REQUEST, "Message is required.")
    })?;

    let settings = state.settings.snapshot().await;
    match state.engine.handle(&request.message, &settings).await {
        Ok(reply) => {
            info!(
                event_name = "chat.replied",
                correlation_id = %correlation_id,
                source = reply.source.as_str(),
                "chat reply composed"
            );
            Ok(Json(ChatResponse { reply: reply.text }))
        }
        Err(error) => {
            warn!(
                event_name = "chat.rejected",
                correlation_id = %correlation_id,
                error = %error,
                "chat request rejected"
            );
            let status = StatusCode::from_u16(error.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            Err(ApiError::new(status, error.user_message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::Json;

    use clerky_catalog::UnconfiguredCatalog;
    use clerky_core::ShopContent;
    use clerky_engine::ChatEngine;
    use clerky_llm::{HttpLlmInvoker, ProviderSettings};

    use crate::bootstrap::AppState;
    use crate::settings::SettingsStore;

    use super::{chat, ChatRequest};

    fn test_state() -> AppState {
        let catalog = Arc::new(UnconfiguredCatalog);
        let invoker = HttpLlmInvoker::new(std::time::Duration::from_secs(1))
            .expect("client should build");

        AppState {
            engine: ChatEngine::new(
                Arc::new(ShopContent::default()),
                catalog.clone(),
                Arc::new(invoker),
            ),
            settings: SettingsStore::new(ProviderSettings::default()),
            catalog,
        }
    }

    #[tokio::test]
    async fn shipping_question_returns_the_canned_rates() {
        let Json(response) = chat(
            State(test_state()),
            Ok(Json(ChatRequest { message: "What are your shipping rates?".to_string() })),
        )
        .await
        .expect("reply should compose");

        assert!(response.reply.contains("FREE on orders over £50"));
        assert!(response.reply.contains("£6.99"));
    }

    #[tokio::test]
    async fn empty_message_maps_to_a_400_error_payload() {
        let result = chat(
            State(test_state()),
            Ok(Json(ChatRequest { message: "   ".to_string() })),
        )
        .await;

        let (status, Json(body)) = result.expect_err("empty message should be rejected");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.status, 400);
        assert_eq!(body.error.message, "Message is required.");
    }

    #[tokio::test]
    async fn missing_message_field_defaults_to_empty_and_is_rejected() {
        let result = chat(State(test_state()), Ok(Json(ChatRequest::default()))).await;

        let (status, _) = result.expect_err("defaulted message should be rejected");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
