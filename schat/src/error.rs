//! Chat-layer errors and classification.
//!
//! Only context fitting and the delegated backend call can fail a request.
//! Resolution problems are logged and degraded instead.

use std::error::Error;
use std::fmt::{Display, Formatter};

use sprovider::{ProviderError, ProviderErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// The conversation cannot be reduced to fit the token budget.
    ContextExceedLimit,
    /// The trailing message alone exceeds the absolute size ceiling.
    MessageTooLarge,
    ContentFiltered,
    Provider,
    InvalidConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn context_exceed_limit() -> Self {
        Self::new(
            ChatErrorKind::ContextExceedLimit,
            "conversation exceeds the model's context limit; start a new conversation or shorten the input",
        )
    }

    pub fn message_too_large() -> Self {
        Self::new(
            ChatErrorKind::MessageTooLarge,
            "a single message exceeds the maximum length; shorten the input",
        )
    }

    pub fn content_filtered(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ContentFiltered, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Provider, message)
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidConfiguration, message)
    }

    /// True for failures the end user can fix by shortening or restarting the conversation.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self.kind,
            ChatErrorKind::ContextExceedLimit | ChatErrorKind::MessageTooLarge
        )
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        match value.kind {
            ProviderErrorKind::ContentFiltered => ChatError::content_filtered(value.message),
            _ => ChatError::provider(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_keep_content_filter_classification() {
        let filtered = ChatError::from(ProviderError::content_filtered("blocked"));
        assert_eq!(filtered.kind, ChatErrorKind::ContentFiltered);
        assert_eq!(filtered.message, "blocked");

        let timeout = ChatError::from(ProviderError::timeout("slow"));
        assert_eq!(timeout.kind, ChatErrorKind::Provider);
        assert!(timeout.message.contains("slow"));
    }

    #[test]
    fn budget_errors_are_user_correctable_with_guidance() {
        let exceeded = ChatError::context_exceed_limit();
        assert!(exceeded.is_user_correctable());
        assert!(exceeded.message.contains("new conversation"));

        assert!(ChatError::message_too_large().is_user_correctable());
        assert!(!ChatError::provider("down").is_user_correctable());
    }
}
