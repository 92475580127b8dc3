use serde::Serialize;

/// A product reduced to what fits in a prompt or a listing line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub title: String,
    /// Already formatted for display, e.g. `£12.50` or `Price not available`.
    pub price: String,
    pub description: String,
}

/// Shop knowledge assembled per request and serialized into the provider's
/// system prompt. `products` is `None` when the message did not warrant a
/// catalog fetch, or when the fetch failed and the context degraded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationContext {
    pub shop_name: String,
    pub policy_text: String,
    pub products: Option<Vec<ProductSummary>>,
}

impl ConversationContext {
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!(
            "You are a helpful shopping assistant for {}. Use the following shop context to answer the customer's question accurately and concisely.\n\n{}",
            self.shop_name, self.policy_text
        );

        if let Some(products) = &self.products {
            prompt.push_str("\n\nProducts currently in stock:");
            for product in products {
                prompt.push_str(&format!("\n- {} ({})", product.title, product.price));
                if !product.description.is_empty() {
                    prompt.push_str(&format!(": {}", product.description));
                }
            }
        }

        prompt
    }
}
