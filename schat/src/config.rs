//! Gateway policy knobs, loadable from JSON.
//!
//! ```rust
//! use schat::GatewayConfig;
//!
//! let config = GatewayConfig::from_json_str(
//!     r#"{"default_provider": "moonshot", "limits": {"max_message_tokens": 8000}}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.default_provider, "moonshot");
//! assert_eq!(config.limits.max_message_tokens, 8000);
//! assert_eq!(config.limits.max_message_words, 20000);
//! assert_eq!(config.fallback_max_context, 4000);
//! ```

use serde::Deserialize;
use sprovider::providers;

use crate::normalize::{ContentRewrite, GEMINI_PRO_VISION, QuirkSet};
use crate::{ChatError, MessageLimits};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Provider assumed for models missing from the catalog.
    pub default_provider: String,
    /// Context window used when neither metadata nor backend report one.
    pub fallback_max_context: usize,
    pub limits: MessageLimits,
    /// Characters kept per text field in request debug logs.
    pub log_redact_chars: usize,
    pub content_rewrites: Vec<ContentRewrite>,
    pub single_turn_models: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_provider: providers::OPENAI.to_string(),
            fallback_max_context: 4000,
            limits: MessageLimits::default(),
            log_redact_chars: 20,
            content_rewrites: vec![ContentRewrite::continuation()],
            single_turn_models: vec![GEMINI_PRO_VISION.to_string()],
        }
    }
}

impl GatewayConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ChatError> {
        serde_json::from_str(json)
            .map_err(|err| ChatError::invalid_configuration(format!("gateway config: {err}")))
    }

    pub fn with_default_provider(mut self, provider: impl Into<String>) -> Self {
        self.default_provider = provider.into();
        self
    }

    pub fn with_fallback_max_context(mut self, tokens: usize) -> Self {
        self.fallback_max_context = tokens;
        self
    }

    pub fn with_limits(mut self, limits: MessageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_content_rewrite(mut self, rewrite: ContentRewrite) -> Self {
        self.content_rewrites.push(rewrite);
        self
    }

    pub fn quirks(&self) -> QuirkSet {
        if self.single_turn_models.is_empty() {
            QuirkSet::empty()
        } else {
            QuirkSet::single_turn(self.single_turn_models.iter().cloned())
        }
    }
}
