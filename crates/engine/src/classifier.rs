//! Rule-based intent classification.

use std::sync::Arc;

use clerky_core::{Intent, ShopContent};

/// Matches messages against the configured vocabulary. Rules are checked
/// in their configured order and the first hit wins, so specific intents
/// (refunds, the highlighted product) must sit above the generic product
/// rule in the content file.
#[derive(Clone)]
pub struct IntentClassifier {
    content: Arc<ShopContent>,
}

impl IntentClassifier {
    pub fn new(content: Arc<ShopContent>) -> Self {
        Self { content }
    }

    pub fn classify(&self, message: &str) -> Intent {
        let normalized = message.to_lowercase();
        self.content
            .vocabulary
            .rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.intent)
            .unwrap_or(Intent::General)
    }
}
