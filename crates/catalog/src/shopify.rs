use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use clerky_core::config::CatalogConfig;

use crate::{CatalogError, CatalogGateway, Collection, Product};

/// Admin API client for a single storefront. Requests are authenticated
/// with the shop access token and scoped to one pinned API version.
#[derive(Clone)]
pub struct ShopifyCatalog {
    client: Client,
    base_url: String,
    access_token: SecretString,
}

#[derive(Debug, Deserialize)]
struct ProductsEnvelope {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct CollectionsEnvelope {
    #[serde(default)]
    custom_collections: Vec<Collection>,
}

impl ShopifyCatalog {
    /// Builds a client from catalog configuration. Returns `Ok(None)` when
    /// credentials are absent so the caller can fall back to
    /// [`crate::UnconfiguredCatalog`].
    pub fn from_config(config: &CatalogConfig) -> Result<Option<Self>, CatalogError> {
        let (Some(shop_domain), Some(access_token)) =
            (&config.shop_domain, &config.access_token)
        else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(CatalogError::Transport)?;

        Ok(Some(Self {
            client,
            base_url: admin_base_url(shop_domain, &config.api_version),
            access_token: access_token.clone(),
        }))
    }

    async fn fetch<T: DeserializeOwned>(&self, url: String) -> Result<T, CatalogError> {
        debug!(event_name = "catalog.request", url = %url, "requesting catalog resource");

        let response = self
            .client
            .get(&url)
            .header("X-Shopify-Access-Token", self.access_token.expose_secret())
            .send()
            .await
            .map_err(CatalogError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::UpstreamStatus { status: status.as_u16(), body });
        }

        response.json::<T>().await.map_err(|error| CatalogError::Decode(error.to_string()))
    }
}

#[async_trait]
impl CatalogGateway for ShopifyCatalog {
    async fn list_products(
        &self,
        limit: usize,
        collection_id: Option<u64>,
    ) -> Result<Vec<Product>, CatalogError> {
        let envelope: ProductsEnvelope =
            self.fetch(products_url(&self.base_url, limit, collection_id)).await?;
        Ok(envelope.products)
    }

    async fn list_collections(&self) -> Result<Vec<Collection>, CatalogError> {
        let envelope: CollectionsEnvelope =
            self.fetch(format!("{}/custom_collections.json", self.base_url)).await?;
        Ok(envelope.custom_collections)
    }
}

fn admin_base_url(shop_domain: &str, api_version: &str) -> String {
    format!("https://{shop_domain}/admin/api/{api_version}")
}

fn products_url(base_url: &str, limit: usize, collection_id: Option<u64>) -> String {
    let mut url = format!("{base_url}/products.json?limit={limit}");
    if let Some(collection_id) = collection_id {
        url.push_str(&format!("&collection_id={collection_id}"));
    }
    url
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use clerky_core::config::CatalogConfig;

    use super::{admin_base_url, products_url, ShopifyCatalog};

    fn configured() -> CatalogConfig {
        CatalogConfig {
            shop_domain: Some("willow-wren.myshopify.com".to_string()),
            access_token: Some(SecretString::from("shpat_test".to_string())),
            api_version: "2023-10".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn from_config_requires_both_domain_and_token() {
        let mut config = configured();
        assert!(ShopifyCatalog::from_config(&config).expect("build").is_some());

        config.access_token = None;
        assert!(ShopifyCatalog::from_config(&config).expect("build").is_none());

        config.access_token = Some(SecretString::from("shpat_test".to_string()));
        config.shop_domain = None;
        assert!(ShopifyCatalog::from_config(&config).expect("build").is_none());
    }

    #[test]
    fn base_url_pins_the_api_version() {
        assert_eq!(
            admin_base_url("willow-wren.myshopify.com", "2023-10"),
            "https://willow-wren.myshopify.com/admin/api/2023-10"
        );
    }

    #[test]
    fn products_url_scopes_to_a_collection_only_when_asked() {
        let base = "https://willow-wren.myshopify.com/admin/api/2023-10";

        assert_eq!(products_url(base, 5, None), format!("{base}/products.json?limit=5"));
        assert_eq!(
            products_url(base, 5, Some(88)),
            format!("{base}/products.json?limit=5&collection_id=88")
        );
    }
}
