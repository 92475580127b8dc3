//! Read-only access to the storefront product catalog.
//!
//! The engine talks to the catalog through [`CatalogGateway`] so listing and
//! context assembly can be tested against scripted data. [`ShopifyCatalog`]
//! is the production implementation; [`UnconfiguredCatalog`] stands in when
//! no storefront credentials are present and lets every catalog feature
//! degrade instead of failing the request.

pub mod shopify;
pub mod summary;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use shopify::ShopifyCatalog;

/// Product cap for connectivity probes (health endpoint, doctor command).
pub const CONNECTIVITY_PROBE_LIMIT: usize = 3;

/// A product as the storefront API returns it. Everything beyond `id` and
/// `title` is optional; merchants leave fields blank more often than API
/// docs suggest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub price: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Variant {
    #[serde(default)]
    pub price: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Collection {
    pub id: u64,
    pub title: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not configured (set catalog.shop_domain and catalog.access_token)")]
    NotConfigured,
    #[error("catalog request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("catalog returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
}

impl CatalogError {
    /// Status to surface when a catalog read is proxied straight through to
    /// an HTTP caller. Upstream statuses pass through unchanged.
    pub fn proxy_status(&self) -> u16 {
        match self {
            Self::NotConfigured => 503,
            Self::Transport(_) => 502,
            Self::UpstreamStatus { status, .. } => *status,
            Self::Decode(_) => 502,
        }
    }
}

#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Lists up to `limit` products, optionally scoped to one collection.
    async fn list_products(
        &self,
        limit: usize,
        collection_id: Option<u64>,
    ) -> Result<Vec<Product>, CatalogError>;

    async fn list_collections(&self) -> Result<Vec<Collection>, CatalogError>;
}

/// Gateway used when no storefront credentials are configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredCatalog;

#[async_trait]
impl CatalogGateway for UnconfiguredCatalog {
    async fn list_products(
        &self,
        _limit: usize,
        _collection_id: Option<u64>,
    ) -> Result<Vec<Product>, CatalogError> {
        Err(CatalogError::NotConfigured)
    }

    async fn list_collections(&self) -> Result<Vec<Collection>, CatalogError> {
        Err(CatalogError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogError, CatalogGateway, Product, UnconfiguredCatalog};

    #[tokio::test]
    async fn unconfigured_catalog_refuses_every_call() {
        let catalog = UnconfiguredCatalog;

        assert!(matches!(
            catalog.list_products(5, None).await,
            Err(CatalogError::NotConfigured)
        ));
        assert!(matches!(catalog.list_collections().await, Err(CatalogError::NotConfigured)));
    }

    #[test]
    fn product_decodes_with_missing_optional_fields() {
        let product: Product =
            serde_json::from_str(r#"{"id": 7, "title": "Stoneware Jug"}"#).expect("valid product");

        assert_eq!(product.id, 7);
        assert_eq!(product.title, "Stoneware Jug");
        assert!(product.body_html.is_none());
        assert!(product.variants.is_empty());
        assert!(product.price.is_none());
    }

    #[test]
    fn upstream_status_passes_through_when_proxied() {
        let error = CatalogError::UpstreamStatus { status: 429, body: "slow down".to_string() };

        assert_eq!(error.proxy_status(), 429);
        assert_eq!(CatalogError::NotConfigured.proxy_status(), 503);
    }
}
