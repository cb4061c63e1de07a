//! Builds dedicated backends for configured channels.
//!
//! Channels of the OpenAI-compatible families (`openai`, `oneapi`,
//! `openrouter`) get a client built from their own server, credential and
//! flags. Other channel types are served by the registry instead. The HTTP
//! implementation lives in [`crate::adapters::openai::HttpBackendFactory`].
//!
//! ```rust
//! use sprovider::{BackendFamily, HttpBackendConfig};
//!
//! assert_eq!(BackendFamily::from_channel_type("openrouter"), Some(BackendFamily::OpenRouter));
//! assert_eq!(BackendFamily::from_channel_type("dashscope"), None);
//!
//! let config: HttpBackendConfig = serde_json::from_str(r#"{"timeout_secs": 30}"#).unwrap();
//! assert_eq!(config.timeout_secs, 30);
//! assert_eq!(config.openrouter_server, "https://openrouter.ai/api/v1");
//! ```

use std::sync::Arc;

use serde::Deserialize;

use crate::{Channel, ChatBackend, ProviderError, providers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendFamily {
    OpenAi,
    OneApi,
    OpenRouter,
}

impl BackendFamily {
    /// Families whose channels are built on demand; `None` for every other type.
    pub fn from_channel_type(channel_type: &str) -> Option<Self> {
        match channel_type {
            providers::OPENAI => Some(Self::OpenAi),
            providers::ONEAPI => Some(Self::OneApi),
            providers::OPENROUTER => Some(Self::OpenRouter),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => providers::OPENAI,
            Self::OneApi => providers::ONEAPI,
            Self::OpenRouter => providers::OPENROUTER,
        }
    }
}

pub trait BackendFactory: Send + Sync {
    fn build(
        &self,
        family: BackendFamily,
        channel: &Channel,
    ) -> Result<Arc<dyn ChatBackend>, ProviderError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpBackendConfig {
    pub timeout_secs: u64,
    /// Used only by channels flagged `using_proxy`.
    pub proxy_url: Option<String>,
    pub openrouter_server: String,
    pub openrouter_referer: String,
    pub openrouter_title: String,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 90,
            proxy_url: None,
            openrouter_server: "https://openrouter.ai/api/v1".to_string(),
            openrouter_referer: "https://web.aicode.cc".to_string(),
            openrouter_title: "AIdea".to_string(),
        }
    }
}

impl HttpBackendConfig {
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_round_trips_through_channel_type() {
        for family in [BackendFamily::OpenAi, BackendFamily::OneApi, BackendFamily::OpenRouter] {
            assert_eq!(BackendFamily::from_channel_type(family.as_str()), Some(family));
        }
        assert_eq!(BackendFamily::from_channel_type(providers::ZHIPU), None);
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: HttpBackendConfig =
            serde_json::from_str(r#"{"proxy_url": "http://127.0.0.1:7890"}"#).expect("config");

        assert_eq!(config.timeout_secs, 90);
        assert_eq!(config.proxy_url.as_deref(), Some("http://127.0.0.1:7890"));
        assert_eq!(config.openrouter_title, "AIdea");
    }
}
