//! Per-request assembly of the provider's shop context.

use std::sync::Arc;

use tracing::{debug, warn};

use clerky_catalog::{summary::summarize, CatalogError, CatalogGateway};
use clerky_core::domain::context::{ConversationContext, ProductSummary};
use clerky_core::ShopContent;

/// Most products a context snapshot will carry. Keeps the system prompt
/// well under provider token limits even for large catalogs.
pub const CONTEXT_PRODUCT_LIMIT: usize = 10;

/// Builds the [`ConversationContext`] for one message. The catalog is only
/// consulted when the message uses product vocabulary, and a catalog
/// failure degrades the context to policy text alone rather than failing
/// the request.
#[derive(Clone)]
pub struct ContextBuilder {
    content: Arc<ShopContent>,
    catalog: Arc<dyn CatalogGateway>,
}

impl ContextBuilder {
    pub fn new(content: Arc<ShopContent>, catalog: Arc<dyn CatalogGateway>) -> Self {
        Self { content, catalog }
    }

    pub async fn build(&self, message: &str) -> ConversationContext {
        let normalized = message.to_lowercase();
        let products = if self.content.vocabulary.mentions_products(&normalized) {
            self.fetch_snapshot().await
        } else {
            None
        };

        ConversationContext {
            shop_name: self.content.shop.name.clone(),
            policy_text: self.content.policy_context.clone(),
            products,
        }
    }

    async fn fetch_snapshot(&self) -> Option<Vec<ProductSummary>> {
        match self.catalog.list_products(CONTEXT_PRODUCT_LIMIT, None).await {
            Ok(products) => Some(products.iter().map(summarize).collect()),
            Err(CatalogError::NotConfigured) => {
                debug!(event_name = "context.catalog_skipped", "catalog not configured");
                None
            }
            Err(err) => {
                warn!(
                    event_name = "context.catalog_error",
                    error = %err,
                    "context degrades to policy text only"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use clerky_core::ShopContent;

    use crate::testing::{product, CollectionScript, ProductScript, ScriptedCatalog};

    use super::{ContextBuilder, CONTEXT_PRODUCT_LIMIT};

    fn builder(catalog: Arc<ScriptedCatalog>) -> ContextBuilder {
        ContextBuilder::new(Arc::new(ShopContent::default()), catalog)
    }

    #[tokio::test]
    async fn product_questions_fetch_a_capped_snapshot() {
        let products =
            (1..=12).map(|id| product(id, &format!("Piece {id}"), "10.00")).collect();
        let catalog = Arc::new(ScriptedCatalog::stocked(products, Vec::new()));

        let context = builder(Arc::clone(&catalog)).build("what products do you sell?").await;

        let snapshot = context.products.expect("snapshot should be present");
        assert_eq!(snapshot.len(), CONTEXT_PRODUCT_LIMIT);
        assert_eq!(catalog.product_calls(), vec![(CONTEXT_PRODUCT_LIMIT, None)]);
    }

    #[tokio::test]
    async fn non_product_questions_skip_the_catalog() {
        let catalog = Arc::new(ScriptedCatalog::stocked(
            vec![product(1, "Oak Serving Board", "32.00")],
            Vec::new(),
        ));

        let context = builder(Arc::clone(&catalog)).build("what is your privacy policy?").await;

        assert!(context.products.is_none());
        assert!(catalog.product_calls().is_empty());
        assert_eq!(context.shop_name, "Willow & Wren");
        assert!(!context.policy_text.is_empty());
    }

    #[tokio::test]
    async fn catalog_outage_degrades_to_policy_text_only() {
        let catalog = Arc::new(ScriptedCatalog::new(
            ProductScript::Outage,
            CollectionScript::Stocked(Vec::new()),
        ));

        let context = builder(catalog).build("show me your products").await;

        assert!(context.products.is_none());
        assert!(!context.policy_text.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_catalog_degrades_quietly() {
        let catalog = Arc::new(ScriptedCatalog::new(
            ProductScript::NotConfigured,
            CollectionScript::Stocked(Vec::new()),
        ));

        let context = builder(catalog).build("show me your products").await;

        assert!(context.products.is_none());
    }
}
