//! Scripted collaborators shared by the engine test modules.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use clerky_catalog::{CatalogError, CatalogGateway, Collection, Product};
use clerky_core::domain::context::ConversationContext;
use clerky_llm::{LlmInvoker, LlmOutcome, ProviderSettings};

pub(crate) enum ProductScript {
    Stocked(Vec<Product>),
    NotConfigured,
    Outage,
}

pub(crate) enum CollectionScript {
    Stocked(Vec<Collection>),
    Outage,
}

pub(crate) struct ScriptedCatalog {
    products: ProductScript,
    collections: CollectionScript,
    product_calls: Mutex<Vec<(usize, Option<u64>)>>,
    collection_calls: AtomicUsize,
}

impl ScriptedCatalog {
    pub(crate) fn new(products: ProductScript, collections: CollectionScript) -> Self {
        Self {
            products,
            collections,
            product_calls: Mutex::new(Vec::new()),
            collection_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn stocked(products: Vec<Product>, collections: Vec<Collection>) -> Self {
        Self::new(ProductScript::Stocked(products), CollectionScript::Stocked(collections))
    }

    pub(crate) fn product_calls(&self) -> Vec<(usize, Option<u64>)> {
        self.product_calls.lock().expect("product call log lock").clone()
    }

    pub(crate) fn collection_calls(&self) -> usize {
        self.collection_calls.load(Ordering::SeqCst)
    }

    fn outage() -> CatalogError {
        CatalogError::UpstreamStatus { status: 502, body: "upstream down".to_string() }
    }
}

#[async_trait]
impl CatalogGateway for ScriptedCatalog {
    async fn list_products(
        &self,
        limit: usize,
        collection_id: Option<u64>,
    ) -> Result<Vec<Product>, CatalogError> {
        self.product_calls.lock().expect("product call log lock").push((limit, collection_id));
        match &self.products {
            ProductScript::Stocked(products) => {
                Ok(products.iter().take(limit).cloned().collect())
            }
            ProductScript::NotConfigured => Err(CatalogError::NotConfigured),
            ProductScript::Outage => Err(Self::outage()),
        }
    }

    async fn list_collections(&self) -> Result<Vec<Collection>, CatalogError> {
        self.collection_calls.fetch_add(1, Ordering::SeqCst);
        match &self.collections {
            CollectionScript::Stocked(collections) => Ok(collections.clone()),
            CollectionScript::Outage => Err(Self::outage()),
        }
    }
}

pub(crate) fn product(id: u64, title: &str, price: &str) -> Product {
    Product {
        id,
        title: title.to_string(),
        variants: vec![clerky_catalog::Variant { price: Some(price.to_string()) }],
        ..Product::default()
    }
}

pub(crate) struct ScriptedInvoker {
    outcome: LlmOutcome,
    calls: AtomicUsize,
    seen_contexts: Mutex<Vec<ConversationContext>>,
}

impl ScriptedInvoker {
    pub(crate) fn with_outcome(outcome: LlmOutcome) -> Self {
        Self { outcome, calls: AtomicUsize::new(0), seen_contexts: Mutex::new(Vec::new()) }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn seen_contexts(&self) -> Vec<ConversationContext> {
        self.seen_contexts.lock().expect("context log lock").clone()
    }
}

#[async_trait]
impl LlmInvoker for ScriptedInvoker {
    async fn invoke(
        &self,
        context: &ConversationContext,
        _message: &str,
        _settings: &ProviderSettings,
    ) -> LlmOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_contexts.lock().expect("context log lock").push(context.clone());
        self.outcome.clone()
    }
}
