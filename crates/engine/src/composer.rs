//! Rule-based reply composition.

use std::sync::Arc;

use tracing::{debug, warn};

use clerky_catalog::{summary::summarize, CatalogGateway, Collection, Product};
use clerky_core::{Intent, ShopContent};

/// Most products a composed listing will show.
pub const LISTING_LIMIT: usize = 5;

/// Turns a classified intent into reply text. Canned intents read straight
/// from the content file; product listings consult the live catalog, scoped
/// to a collection when the message matches a collection hint.
#[derive(Clone)]
pub struct ResponseComposer {
    content: Arc<ShopContent>,
    catalog: Arc<dyn CatalogGateway>,
}

impl ResponseComposer {
    pub fn new(content: Arc<ShopContent>, catalog: Arc<dyn CatalogGateway>) -> Self {
        Self { content, catalog }
    }

    pub async fn compose(&self, intent: Intent, message: &str) -> String {
        match self.content.replies.canned(intent) {
            Some(reply) => reply.to_string(),
            None => self.product_listing(message).await,
        }
    }

    async fn product_listing(&self, message: &str) -> String {
        let normalized = message.to_lowercase();
        let scope = self.resolve_scope(&normalized).await;

        let collection_id = scope.as_ref().map(|collection| collection.id);
        match self.catalog.list_products(LISTING_LIMIT, collection_id).await {
            Ok(products) if products.is_empty() => self.empty_listing(scope.as_ref()),
            Ok(products) => self.render_listing(scope.as_ref(), &products),
            Err(err) => {
                warn!(
                    event_name = "compose.catalog_error",
                    error = %err,
                    "product listing unavailable"
                );
                self.content.replies.catalog_unavailable.clone()
            }
        }
    }

    /// A listing is scoped only when the message uses a hinted theme AND
    /// the storefront has a collection whose title matches that hint. If
    /// collections cannot be fetched the listing quietly stays unscoped.
    async fn resolve_scope(&self, normalized_message: &str) -> Option<Collection> {
        let hint = self.content.vocabulary.collection_hint_for(normalized_message)?;
        let collections = match self.catalog.list_collections().await {
            Ok(collections) => collections,
            Err(err) => {
                debug!(
                    event_name = "compose.collections_unavailable",
                    error = %err,
                    "listing falls back to the full range"
                );
                return None;
            }
        };

        collections.into_iter().find(|collection| hint.matches_title(&collection.title))
    }

    fn empty_listing(&self, scope: Option<&Collection>) -> String {
        match scope {
            Some(collection) => {
                self.content.replies.empty_collection.replace("{collection}", &collection.title)
            }
            None => self.content.replies.empty_catalog.clone(),
        }
    }

    fn render_listing(&self, scope: Option<&Collection>, products: &[Product]) -> String {
        let mut reply = match scope {
            Some(collection) => {
                self.content
                    .replies
                    .listing_intro_collection
                    .replace("{collection}", &collection.title)
            }
            None => self.content.replies.listing_intro.clone(),
        };

        for product in products {
            let summary = summarize(product);
            reply.push_str(&format!("\n• {} - {}", summary.title, summary.price));
            if !summary.description.is_empty() {
                reply.push_str(&format!("\n  {}", summary.description));
            }
        }

        reply.push_str("\n\n");
        reply.push_str(&self.content.replies.listing_outro);
        reply
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use clerky_catalog::Collection;
    use clerky_core::{Intent, ShopContent};

    use crate::testing::{product, CollectionScript, ProductScript, ScriptedCatalog};

    use super::{ResponseComposer, LISTING_LIMIT};

    fn composer(catalog: Arc<ScriptedCatalog>) -> ResponseComposer {
        ResponseComposer::new(Arc::new(ShopContent::default()), catalog)
    }

    fn kitchen_collections() -> Vec<Collection> {
        vec![
            Collection { id: 41, title: "Seasonal Picks".to_string() },
            Collection { id: 88, title: "Kitchen Essentials".to_string() },
        ]
    }

    #[tokio::test]
    async fn kitchen_questions_list_the_kitchen_collection() {
        let catalog = Arc::new(ScriptedCatalog::stocked(
            vec![
                product(1, "Oak Serving Board", "32.00"),
                product(2, "Stoneware Mixing Bowl", "28.00"),
            ],
            kitchen_collections(),
        ));

        let reply = composer(Arc::clone(&catalog))
            .compose(Intent::Products, "what kitchen items do you sell?")
            .await;

        assert!(reply.contains("Kitchen Essentials"));
        assert!(reply.contains("• Oak Serving Board - £32.00"));
        assert!(reply.contains("• Stoneware Mixing Bowl - £28.00"));
        assert_eq!(catalog.product_calls(), vec![(LISTING_LIMIT, Some(88))]);
        assert_eq!(catalog.collection_calls(), 1);
    }

    #[tokio::test]
    async fn plain_product_questions_list_the_full_range() {
        let catalog = Arc::new(ScriptedCatalog::stocked(
            vec![product(1, "Linen Apron", "18.50")],
            kitchen_collections(),
        ));

        let reply =
            composer(Arc::clone(&catalog)).compose(Intent::Products, "show me your products").await;

        assert!(reply.starts_with("Here are some pieces from our current range:"));
        assert!(reply.contains("• Linen Apron - £18.50"));
        assert_eq!(catalog.product_calls(), vec![(LISTING_LIMIT, None)]);
        assert_eq!(catalog.collection_calls(), 0);
    }

    #[tokio::test]
    async fn empty_scoped_results_name_the_collection() {
        let catalog = Arc::new(ScriptedCatalog::stocked(Vec::new(), kitchen_collections()));

        let reply = composer(Arc::clone(&catalog))
            .compose(Intent::Products, "any kitchen pieces?")
            .await;

        assert!(reply.contains("Kitchen Essentials"));
        assert!(!reply.contains('•'));
        assert_ne!(reply, ShopContent::default().replies.empty_catalog);
    }

    #[tokio::test]
    async fn empty_unscoped_results_use_the_catalog_message() {
        let catalog = Arc::new(ScriptedCatalog::stocked(Vec::new(), Vec::new()));

        let reply =
            composer(Arc::clone(&catalog)).compose(Intent::Products, "what do you sell?").await;

        assert_eq!(reply, ShopContent::default().replies.empty_catalog);
    }

    #[tokio::test]
    async fn catalog_outage_yields_the_unavailable_reply() {
        let catalog = Arc::new(ScriptedCatalog::new(
            ProductScript::Outage,
            CollectionScript::Stocked(Vec::new()),
        ));

        let reply =
            composer(catalog).compose(Intent::Products, "what do you sell?").await;

        assert_eq!(reply, ShopContent::default().replies.catalog_unavailable);
    }

    #[tokio::test]
    async fn collections_outage_falls_back_to_the_full_range() {
        let catalog = Arc::new(ScriptedCatalog::new(
            ProductScript::Stocked(vec![product(1, "Oak Serving Board", "32.00")]),
            CollectionScript::Outage,
        ));

        let reply = composer(Arc::clone(&catalog))
            .compose(Intent::Products, "what kitchen items do you sell?")
            .await;

        assert!(reply.starts_with("Here are some pieces from our current range:"));
        assert_eq!(catalog.product_calls(), vec![(LISTING_LIMIT, None)]);
    }

    #[tokio::test]
    async fn canned_intents_never_touch_the_catalog() {
        let catalog = Arc::new(ScriptedCatalog::stocked(Vec::new(), Vec::new()));
        let composer = composer(Arc::clone(&catalog));

        let shipping = composer.compose(Intent::Shipping, "how much is delivery?").await;
        let highlighted =
            composer.compose(Intent::HighlightedProduct, "tell me about the candle trio").await;

        assert!(shipping.contains("£6.99"));
        assert!(highlighted.contains("Orchard Candle Trio"));
        assert!(catalog.product_calls().is_empty());
        assert_eq!(catalog.collection_calls(), 0);
    }

    #[tokio::test]
    async fn listings_describe_products_on_indented_lines() {
        let mut described = product(1, "Oak Serving Board", "32.00");
        described.body_html = Some("<p>Solid oak, oiled finish.</p>".to_string());
        let catalog = Arc::new(ScriptedCatalog::stocked(vec![described], Vec::new()));

        let reply =
            composer(catalog).compose(Intent::Products, "show me your products").await;

        assert!(reply.contains("• Oak Serving Board - £32.00\n  Solid oak, oiled finish."));
        assert!(reply.ends_with(ShopContent::default().replies.listing_outro.as_str()));
    }
}
