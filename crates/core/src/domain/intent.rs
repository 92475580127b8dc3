use serde::{Deserialize, Serialize};

/// Everything a customer message can be classified as. Variants are listed
/// in matching priority order: the classifier walks the vocabulary rules
/// top to bottom and the first hit wins, so a refund question that also
/// mentions a product stays a refund question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Faq,
    Refund,
    Shipping,
    Privacy,
    Terms,
    Contact,
    Social,
    Rewards,
    /// The shop's highlighted product, answered with a pre-authored block.
    HighlightedProduct,
    /// A general product/browsing question, answered with a live listing.
    Products,
    /// Nothing matched; answered with the greeting reply.
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faq => "faq",
            Self::Refund => "refund",
            Self::Shipping => "shipping",
            Self::Privacy => "privacy",
            Self::Terms => "terms",
            Self::Contact => "contact",
            Self::Social => "social",
            Self::Rewards => "rewards",
            Self::HighlightedProduct => "highlighted_product",
            Self::Products => "products",
            Self::General => "general",
        }
    }
}
