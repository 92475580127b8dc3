//! Editable shop content: canned reply blocks, classification vocabularies,
//! and collection hints.
//!
//! Everything a shopkeeper might want to reword lives here as data, not
//! code. The built-in defaults describe the Willow & Wren storefront; a
//! content file referenced by `content.path` patches individual sections
//! without having to restate the rest.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::intent::Intent;

const DEFAULT_SHOP_NAME: &str = "Willow & Wren";
const DEFAULT_STOREFRONT_URL: &str = "https://willowandwren.co.uk";
const DEFAULT_SUPPORT_EMAIL: &str = "hello@willowandwren.co.uk";

const GREETING_REPLY: &str = "Hello! Welcome to Willow & Wren. I can help with orders, delivery, returns and our product range.
Try asking about delivery times, our returns policy, or say \"show me your products\" to browse.";

const FAQ_REPLY: &str = "Here are the questions we hear most often:
• Delivery: standard UK delivery takes 3 to 5 working days.
• Returns: you have 30 days to return anything unused.
• Stock: our range changes with the seasons, so check back often.
Ask me about any of these and I can go into more detail.";

const REFUND_REPLY: &str = "Our returns policy is simple:
• You can return any unused item within 30 days of delivery for a full refund.
• Refunds go back to your original payment method within 5 working days of us receiving the item.
• To start a return, reply to your order confirmation email or contact hello@willowandwren.co.uk with your order number.
Sale items can be exchanged but not refunded.";

const SHIPPING_REPLY: &str = "Here is how delivery works:
• Standard UK delivery is £6.99 and takes 3 to 5 working days.
• Delivery is FREE on orders over £50.
• Express next-working-day delivery is £9.99 when ordered before 1pm.
• Once your order ships you will receive a tracking email, so you can see exactly where it is.";

const PRIVACY_REPLY: &str = "We take your privacy seriously:
• We only collect the details needed to fulfil your order.
• We never sell your personal data to third parties.
• You can ask us to delete your data at any time by emailing hello@willowandwren.co.uk.
The full privacy policy is at https://willowandwren.co.uk/pages/privacy.";

const TERMS_REPLY: &str = "The short version of our terms:
• All prices include VAT.
• Orders can be cancelled free of charge until they are dispatched.
• Faulty items are replaced or refunded at no cost to you.
The full terms and conditions are at https://willowandwren.co.uk/pages/terms.";

const CONTACT_REPLY: &str = "You can reach us in whichever way suits you:
• Email: hello@willowandwren.co.uk (we reply within one working day)
• Phone: 020 7946 0823, Monday to Friday, 9am to 5pm
• Post: Willow & Wren, 14 Berry Lane, Bristol BS1 4DJ
We are a small team, so email is usually fastest.";

const SOCIAL_REPLY: &str = "Come and say hello:
• Instagram: @willowandwren for styling ideas and new arrivals
• Pinterest: willowandwren for seasonal moodboards
• Facebook: Willow & Wren for community news
Tag us in your photos, we love seeing our pieces at home.";

const REWARDS_REPLY: &str = "The Willow Circle is our free rewards scheme:
• Earn 1 point for every £1 you spend.
• 100 points unlocks a £5 voucher.
• Members get early access to seasonal collections.
Join at https://willowandwren.co.uk/pages/rewards or at checkout.";

const HIGHLIGHTED_PRODUCT_REPLY: &str = "The Orchard Candle Trio is our signature set and a customer favourite:
• Three hand-poured soy candles: Bramley Apple, Wild Pear and Damson Plum.
• Around 35 hours of burn time each.
• £24.00 for the set, with a recycled gift box included.
Find it at https://willowandwren.co.uk/products/orchard-candle-trio.";

const LISTING_INTRO: &str = "Here are some pieces from our current range:";
const LISTING_INTRO_COLLECTION: &str = "Here are some pieces from our {collection} collection:";
const LISTING_OUTRO: &str = "You can browse the full range at https://willowandwren.co.uk. Ask me about any piece and I will tell you more.";

const EMPTY_CATALOG_REPLY: &str = "It looks like our online range is being restocked right now. Check back soon, or browse https://willowandwren.co.uk for the latest pieces.";
const EMPTY_COLLECTION_REPLY: &str = "We do not have anything in our {collection} collection right now. It is usually restocked with the seasons, so check back soon or ask about the rest of the range.";
const CATALOG_UNAVAILABLE_REPLY: &str = "I cannot reach our product catalogue at the moment. Please try again shortly, or browse https://willowandwren.co.uk in the meantime.";

const POLICY_CONTEXT: &str = "Willow & Wren is a UK homewares shop selling kitchen, living and bath pieces made by small British makers.
Delivery: standard UK delivery is £6.99 (3 to 5 working days) and FREE on orders over £50. Express delivery is £9.99.
Returns: unused items can be returned within 30 days for a full refund.
Contact: hello@willowandwren.co.uk.
Signature product: the Orchard Candle Trio, £24.00 for three soy candles (Bramley Apple, Wild Pear and Damson Plum).";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("could not read content file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse content file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("content validation failed: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ShopContent {
    pub shop: ShopProfile,
    /// Plain-text shop knowledge serialized into the provider system prompt.
    pub policy_context: String,
    pub replies: ReplySet,
    pub vocabulary: VocabularySet,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ShopProfile {
    pub name: String,
    pub storefront_url: String,
    pub support_email: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ReplySet {
    pub greeting: String,
    pub faq: String,
    pub refund: String,
    pub shipping: String,
    pub privacy: String,
    pub terms: String,
    pub contact: String,
    pub social: String,
    pub rewards: String,
    pub highlighted_product: String,
    pub listing_intro: String,
    /// Listing intro used when results are scoped to a matched collection.
    /// `{collection}` is replaced with the collection title.
    pub listing_intro_collection: String,
    pub listing_outro: String,
    pub empty_catalog: String,
    /// Zero results inside a matched collection. `{collection}` is replaced
    /// with the collection title.
    pub empty_collection: String,
    pub catalog_unavailable: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct VocabularySet {
    /// Classification rules in priority order; the first matching rule wins.
    pub rules: Vec<IntentRule>,
    pub collection_hints: Vec<CollectionHint>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct IntentRule {
    pub intent: Intent,
    pub terms: Vec<String>,
}

/// Maps message wording to catalog collections so a "kitchen" question can
/// be answered with kitchen products. `message_terms` match the customer
/// message; `title_terms` match collection titles from the catalog.
#[derive(Clone, Debug, Deserialize)]
pub struct CollectionHint {
    pub label: String,
    pub message_terms: Vec<String>,
    pub title_terms: Vec<String>,
}

impl Default for ShopContent {
    fn default() -> Self {
        Self {
            shop: ShopProfile::default(),
            policy_context: POLICY_CONTEXT.to_string(),
            replies: ReplySet::default(),
            vocabulary: VocabularySet::default(),
        }
    }
}

impl Default for ShopProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_SHOP_NAME.to_string(),
            storefront_url: DEFAULT_STOREFRONT_URL.to_string(),
            support_email: DEFAULT_SUPPORT_EMAIL.to_string(),
        }
    }
}

impl Default for ReplySet {
    fn default() -> Self {
        Self {
            greeting: GREETING_REPLY.to_string(),
            faq: FAQ_REPLY.to_string(),
            refund: REFUND_REPLY.to_string(),
            shipping: SHIPPING_REPLY.to_string(),
            privacy: PRIVACY_REPLY.to_string(),
            terms: TERMS_REPLY.to_string(),
            contact: CONTACT_REPLY.to_string(),
            social: SOCIAL_REPLY.to_string(),
            rewards: REWARDS_REPLY.to_string(),
            highlighted_product: HIGHLIGHTED_PRODUCT_REPLY.to_string(),
            listing_intro: LISTING_INTRO.to_string(),
            listing_intro_collection: LISTING_INTRO_COLLECTION.to_string(),
            listing_outro: LISTING_OUTRO.to_string(),
            empty_catalog: EMPTY_CATALOG_REPLY.to_string(),
            empty_collection: EMPTY_COLLECTION_REPLY.to_string(),
            catalog_unavailable: CATALOG_UNAVAILABLE_REPLY.to_string(),
        }
    }
}

impl Default for VocabularySet {
    fn default() -> Self {
        Self { rules: default_rules(), collection_hints: default_collection_hints() }
    }
}

fn rule(intent: Intent, terms: &[&str]) -> IntentRule {
    IntentRule { intent, terms: terms.iter().map(|term| term.to_string()).collect() }
}

fn default_rules() -> Vec<IntentRule> {
    vec![
        rule(Intent::Faq, &["faq", "frequently asked", "common questions"]),
        rule(
            Intent::Refund,
            &["refund", "return", "money back", "exchange", "send it back", "cancel my order"],
        ),
        rule(
            Intent::Shipping,
            &[
                "ship",
                "deliver",
                "postage",
                "dispatch",
                "track",
                "where is my order",
                "order status",
                "how long does",
            ],
        ),
        rule(Intent::Privacy, &["privacy", "personal data", "gdpr", "my data"]),
        rule(Intent::Terms, &["terms", "conditions", "t&c", "legal"]),
        rule(
            Intent::Contact,
            &["contact", "email", "phone", "speak to", "talk to", "get in touch", "customer service"],
        ),
        rule(
            Intent::Social,
            &["instagram", "facebook", "pinterest", "tiktok", "social media", "follow you"],
        ),
        rule(Intent::Rewards, &["reward", "loyalty", "points", "member", "vip"]),
        rule(Intent::HighlightedProduct, &["orchard candle", "candle trio", "orchard trio"]),
        rule(
            Intent::Products,
            &[
                "product",
                "item",
                "stock",
                "buy",
                "purchase",
                "order",
                "sell",
                "browse",
                "collection",
                "range",
                "catalogue",
                "what do you have",
                "show me",
            ],
        ),
    ]
}

fn default_collection_hints() -> Vec<CollectionHint> {
    vec![
        CollectionHint {
            label: "kitchen".to_string(),
            message_terms: vec![
                "kitchen".to_string(),
                "cookware".to_string(),
                "tableware".to_string(),
                "utensil".to_string(),
            ],
            title_terms: vec!["kitchen".to_string()],
        },
        CollectionHint {
            label: "bath & beauty".to_string(),
            message_terms: vec![
                "beauty".to_string(),
                "skincare".to_string(),
                "soap".to_string(),
                "bath".to_string(),
            ],
            title_terms: vec!["beauty".to_string(), "bath".to_string()],
        },
        CollectionHint {
            label: "living".to_string(),
            message_terms: vec![
                "living room".to_string(),
                "throw".to_string(),
                "cushion".to_string(),
                "vase".to_string(),
            ],
            title_terms: vec!["living".to_string()],
        },
    ]
}

impl ShopContent {
    /// Loads content from the given file, or the built-in defaults when no
    /// path is configured. Loaded vocabularies are normalized to lowercase
    /// so matching stays case-insensitive regardless of how the file was
    /// written.
    pub fn load(path: Option<&Path>) -> Result<Self, ContentError> {
        let mut content = match path {
            None => Self::default(),
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ContentError::ReadFile {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str::<Self>(&raw).map_err(|source| ContentError::ParseFile {
                    path: path.to_path_buf(),
                    source,
                })?
            }
        };

        content.normalize();
        content.validate()?;
        Ok(content)
    }

    fn normalize(&mut self) {
        for rule in &mut self.vocabulary.rules {
            for term in &mut rule.terms {
                *term = term.trim().to_lowercase();
            }
            rule.terms.retain(|term| !term.is_empty());
        }
        for hint in &mut self.vocabulary.collection_hints {
            for term in &mut hint.message_terms {
                *term = term.trim().to_lowercase();
            }
            for term in &mut hint.title_terms {
                *term = term.trim().to_lowercase();
            }
            hint.message_terms.retain(|term| !term.is_empty());
            hint.title_terms.retain(|term| !term.is_empty());
        }
    }

    fn validate(&self) -> Result<(), ContentError> {
        if self.shop.name.trim().is_empty() {
            return Err(ContentError::Validation("shop.name must not be empty".to_string()));
        }

        for (name, text) in self.replies.all() {
            if text.trim().is_empty() {
                return Err(ContentError::Validation(format!(
                    "replies.{name} must not be empty"
                )));
            }
        }

        if self.vocabulary.rules.is_empty() {
            return Err(ContentError::Validation(
                "vocabulary.rules must contain at least one rule".to_string(),
            ));
        }
        for rule in &self.vocabulary.rules {
            if rule.terms.is_empty() {
                return Err(ContentError::Validation(format!(
                    "vocabulary rule for `{}` has no terms",
                    rule.intent.as_str()
                )));
            }
        }

        for hint in &self.vocabulary.collection_hints {
            if hint.label.trim().is_empty() {
                return Err(ContentError::Validation(
                    "collection hints must have a label".to_string(),
                ));
            }
            if hint.message_terms.is_empty() || hint.title_terms.is_empty() {
                return Err(ContentError::Validation(format!(
                    "collection hint `{}` needs message_terms and title_terms",
                    hint.label
                )));
            }
        }

        Ok(())
    }
}

impl ReplySet {
    /// The canned block for an intent, or `None` for intents that need the
    /// live catalog (generic product questions).
    pub fn canned(&self, intent: Intent) -> Option<&str> {
        match intent {
            Intent::Faq => Some(&self.faq),
            Intent::Refund => Some(&self.refund),
            Intent::Shipping => Some(&self.shipping),
            Intent::Privacy => Some(&self.privacy),
            Intent::Terms => Some(&self.terms),
            Intent::Contact => Some(&self.contact),
            Intent::Social => Some(&self.social),
            Intent::Rewards => Some(&self.rewards),
            Intent::HighlightedProduct => Some(&self.highlighted_product),
            Intent::General => Some(&self.greeting),
            Intent::Products => None,
        }
    }

    fn all(&self) -> [(&'static str, &str); 16] {
        [
            ("greeting", &self.greeting),
            ("faq", &self.faq),
            ("refund", &self.refund),
            ("shipping", &self.shipping),
            ("privacy", &self.privacy),
            ("terms", &self.terms),
            ("contact", &self.contact),
            ("social", &self.social),
            ("rewards", &self.rewards),
            ("highlighted_product", &self.highlighted_product),
            ("listing_intro", &self.listing_intro),
            ("listing_intro_collection", &self.listing_intro_collection),
            ("listing_outro", &self.listing_outro),
            ("empty_catalog", &self.empty_catalog),
            ("empty_collection", &self.empty_collection),
            ("catalog_unavailable", &self.catalog_unavailable),
        ]
    }
}

impl VocabularySet {
    /// Whether the message is about products at all. Used to decide if the
    /// LLM context should carry a catalog snapshot.
    pub fn mentions_products(&self, normalized_message: &str) -> bool {
        let product_rule_hit = self
            .rules
            .iter()
            .filter(|rule| matches!(rule.intent, Intent::Products | Intent::HighlightedProduct))
            .any(|rule| rule.matches(normalized_message));

        product_rule_hit
            || self.collection_hints.iter().any(|hint| hint.matches_message(normalized_message))
    }

    /// The first hint whose message terms appear in the message.
    pub fn collection_hint_for(&self, normalized_message: &str) -> Option<&CollectionHint> {
        self.collection_hints.iter().find(|hint| hint.matches_message(normalized_message))
    }
}

impl IntentRule {
    pub fn matches(&self, normalized_message: &str) -> bool {
        self.terms.iter().any(|term| normalized_message.contains(term.as_str()))
    }
}

impl CollectionHint {
    pub fn matches_message(&self, normalized_message: &str) -> bool {
        self.message_terms.iter().any(|term| normalized_message.contains(term.as_str()))
    }

    pub fn matches_title(&self, collection_title: &str) -> bool {
        let normalized_title = collection_title.to_lowercase();
        self.title_terms.iter().any(|term| normalized_title.contains(term.as_str()))
    }
}
