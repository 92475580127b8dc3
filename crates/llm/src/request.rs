//! The prepared form of a provider call, before any network activity.

use serde_json::Value;

/// Everything the invoker needs to POST: URL, extra headers, JSON body.
/// Building one of these performs no I/O, which keeps the per-provider
/// request shapes testable without a server.
#[derive(Clone, Debug)]
pub struct ProviderRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

impl ProviderRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| *header == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Providers without a dedicated system slot get the system prompt folded
/// into the user turn in this exact shape.
pub(crate) fn merged_user_prompt(system_prompt: &str, message: &str) -> String {
    format!("{system_prompt}\n\nCustomer question: {message}")
}

#[cfg(test)]
mod tests {
    use super::{merged_user_prompt, ProviderRequest};

    #[test]
    fn header_lookup_finds_a_named_header() {
        let request = ProviderRequest {
            url: "https://example.invalid".to_string(),
            headers: vec![("x-api-key", "secret".to_string())],
            body: serde_json::json!({}),
        };

        assert_eq!(request.header("x-api-key"), Some("secret"));
        assert_eq!(request.header("authorization"), None);
    }

    #[test]
    fn merged_prompt_labels_the_customer_question() {
        let prompt = merged_user_prompt("You are a helpful assistant.", "Do you ship to France?");

        assert_eq!(
            prompt,
            "You are a helpful assistant.\n\nCustomer question: Do you ship to France?"
        );
    }
}
