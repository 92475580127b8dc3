use thiserror::Error;

/// Failures the chat endpoint reports to the caller. Provider and catalog
/// problems never surface here: the engine degrades to rule-based replies
/// instead of failing the request.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::EmptyMessage => 400,
            Self::Internal(_) => 500,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyMessage => "Message is required.",
            Self::Internal(_) => "Something went wrong on our side. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::ChatError;

    #[test]
    fn empty_message_maps_to_bad_request() {
        let error = ChatError::EmptyMessage;

        assert_eq!(error.http_status(), 400);
        assert_eq!(error.user_message(), "Message is required.");
    }

    #[test]
    fn internal_error_maps_to_generic_server_error() {
        let error = ChatError::Internal("settings store poisoned".to_owned());

        assert_eq!(error.http_status(), 500);
        assert_eq!(error.user_message(), "Something went wrong on our side. Please try again.");
        assert!(error.to_string().contains("settings store poisoned"));
    }
}
