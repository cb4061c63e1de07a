//! Process-wide backend registry keyed by provider identifier.
//!
//! Built once at start-up and shared read-only; adding a vendor means
//! registering another backend, not editing routing code.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use sprovider::{
//!     BackendRegistry, BoxedResponseStream, ChatBackend, ChatRequest, ChatResponse,
//!     ProviderError, ProviderFuture, VecResponseStream, providers,
//! };
//!
//! struct Echo;
//!
//! impl ChatBackend for Echo {
//!     fn chat<'a>(&'a self, request: ChatRequest) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>> {
//!         Box::pin(async move { Ok(ChatResponse::text(request.model)) })
//!     }
//!
//!     fn chat_stream<'a>(&'a self, _request: ChatRequest) -> ProviderFuture<'a, Result<BoxedResponseStream, ProviderError>> {
//!         Box::pin(async move { Ok(Box::pin(VecResponseStream::new(Vec::new())) as BoxedResponseStream) })
//!     }
//!
//!     fn max_context_length<'a>(&'a self, _model: &'a str) -> ProviderFuture<'a, usize> {
//!         Box::pin(async { 0 })
//!     }
//! }
//!
//! let registry = BackendRegistry::new(providers::OPENAI, Arc::new(Echo))
//!     .with_backend(providers::MOONSHOT, Arc::new(Echo));
//! assert_eq!(registry.len(), 2);
//! assert!(registry.contains(providers::MOONSHOT));
//! assert!(registry.get("unknown").is_none());
//! ```

use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use scommon::Registry;
use serde::{Deserialize, Serialize};

use crate::ChatBackend;

/// Well-known provider identifiers used by model and channel configuration.
pub mod providers {
    pub const OPENAI: &str = "openai";
    pub const XUNFEI: &str = "xunfei";
    pub const WENXIN: &str = "wenxin";
    pub const DASHSCOPE: &str = "dashscope";
    pub const SENSENOVA: &str = "sensenova";
    pub const TENCENT: &str = "tencent";
    pub const BAICHUAN: &str = "baichuan";
    pub const GPT360: &str = "360";
    pub const ONEAPI: &str = "oneapi";
    pub const OPENROUTER: &str = "openrouter";
    pub const SKY: &str = "sky";
    pub const ZHIPU: &str = "zhipu";
    pub const MOONSHOT: &str = "moonshot";
    pub const GOOGLE: &str = "google";
    pub const ANTHROPIC: &str = "anthropic";
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ProviderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for ProviderId {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

#[derive(Clone)]
pub struct BackendRegistry {
    backends: Registry<ProviderId, Arc<dyn ChatBackend>>,
    default_provider: ProviderId,
    default_backend: Arc<dyn ChatBackend>,
}

impl BackendRegistry {
    /// Creates a registry whose default backend is also registered under `default_provider`.
    pub fn new(default_provider: impl Into<ProviderId>, backend: Arc<dyn ChatBackend>) -> Self {
        let default_provider = default_provider.into();
        let mut backends = Registry::new();
        backends.insert(default_provider.clone(), Arc::clone(&backend));

        Self {
            backends,
            default_provider,
            default_backend: backend,
        }
    }

    pub fn register(&mut self, provider: impl Into<ProviderId>, backend: Arc<dyn ChatBackend>) {
        self.backends.insert(provider.into(), backend);
    }

    pub fn with_backend(
        mut self,
        provider: impl Into<ProviderId>,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        self.register(provider, backend);
        self
    }

    pub fn get(&self, provider: &str) -> Option<Arc<dyn ChatBackend>> {
        self.backends.get(provider).cloned()
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.backends.contains_key(provider)
    }

    pub fn default_provider(&self) -> &ProviderId {
        &self.default_provider
    }

    pub fn default_backend(&self) -> Arc<dyn ChatBackend> {
        Arc::clone(&self.default_backend)
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        let mut ids = self.backends.keys().cloned().collect::<Vec<_>>();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("providers", &self.provider_ids())
            .field("default_provider", &self.default_provider)
            .finish()
    }
}
