use crate::errors::ChatError;

/// A validated, non-empty customer message. Construction trims surrounding
/// whitespace; a message that trims to nothing is rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage(String);

impl ChatMessage {
    pub fn parse(raw: &str) -> Result<Self, ChatError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::ChatMessage;
    use crate::errors::ChatError;

    #[test]
    fn rejects_empty_and_whitespace_only_input() {
        assert_eq!(ChatMessage::parse(""), Err(ChatError::EmptyMessage));
        assert_eq!(ChatMessage::parse("   \t\n "), Err(ChatError::EmptyMessage));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let message = ChatMessage::parse("  where is my order?  ").expect("valid message");
        assert_eq!(message.text(), "where is my order?");
    }
}
