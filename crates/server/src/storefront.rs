//! Storefront catalog passthrough.
//!
//! `GET /api/products?limit=N` lets the widget render product cards
//! without holding storefront credentials of its own.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;

use clerky_catalog::summary::summarize;
use clerky_core::ProductSummary;

use crate::bootstrap::AppState;
use crate::chat::ApiError;

const DEFAULT_LIMIT: usize = 5;
const MAX_LIMIT: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ProductListing {
    pub products: Vec<ProductSummary>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/products", get(list_products))
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductListing>, (StatusCode, Json<ApiError>)> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    match state.catalog.list_products(limit, None).await {
        Ok(products) => {
            Ok(Json(ProductListing { products: products.iter().map(summarize).collect() }))
        }
        Err(error) => {
            warn!(
                event_name = "storefront.catalog_error",
                error = %error,
                "product listing request failed"
            );
            let status =
                StatusCode::from_u16(error.proxy_status()).unwrap_or(StatusCode::BAD_GATEWAY);
            Err(ApiError::new(status, "The product catalogue is unavailable right now."))
        }
    }
}
