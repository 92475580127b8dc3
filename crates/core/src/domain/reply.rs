use serde::Serialize;

/// Which tier produced a reply. Exposed in logs and CLI output, never in
/// the customer-facing payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Llm,
    Rules,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llm => "llm",
            Self::Rules => "rules",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub text: String,
    pub source: ReplySource,
}

impl ChatReply {
    pub fn llm(text: impl Into<String>) -> Self {
        Self { text: text.into(), source: ReplySource::Llm }
    }

    pub fn rules(text: impl Into<String>) -> Self {
        Self { text: text.into(), source: ReplySource::Rules }
    }
}
