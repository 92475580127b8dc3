pub mod config;
pub mod content;
pub mod domain;
pub mod errors;

pub use config::{
    AppConfig, CatalogConfig, ConfigError, ConfigOverrides, ContentConfig, LlmConfig, LoadOptions,
    LogFormat, LoggingConfig, ProviderName, ServerConfig,
};
pub use content::{
    CollectionHint, ContentError, IntentRule, ReplySet, ShopContent, ShopProfile, VocabularySet,
};
pub use domain::context::{ConversationContext, ProductSummary};
pub use domain::intent::Intent;
pub use domain::message::ChatMessage;
pub use domain::reply::{ChatReply, ReplySource};
pub use errors::ChatError;
