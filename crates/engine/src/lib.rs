//! The two-tier chat answering engine.
//!
//! Every customer message runs through the same pipeline. When an LLM
//! provider is configured, [`context::ContextBuilder`] assembles shop
//! knowledge (plus a catalog snapshot for product questions) and the
//! invoker gets one attempt at a generated answer. When the provider is
//! absent, skips, or fails, [`classifier::IntentClassifier`] and
//! [`composer::ResponseComposer`] take over and produce a rule-based
//! reply. The rules tier has no failure mode a customer can see: the
//! worst catalog outage still yields a polite canned answer.

pub mod classifier;
pub mod composer;
pub mod context;
pub mod engine;

#[cfg(test)]
pub(crate) mod testing;

pub use classifier::IntentClassifier;
pub use composer::ResponseComposer;
pub use context::ContextBuilder;
pub use engine::ChatEngine;
