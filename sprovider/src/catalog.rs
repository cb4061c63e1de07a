//! Model and channel configuration entities plus their lookup contracts.
//!
//! The persistent configuration store lives outside this workspace; the
//! in-memory catalogs here back tests and single-process deployments.
//!
//! ```rust
//! use sprovider::{ModelDescriptor, ModelProvider, ProviderId};
//!
//! let descriptor = ModelDescriptor::new("gpt-4o")
//!     .with_provider(ModelProvider::named("openai").with_model_rewrite("gpt-4o-2024-08-06"))
//!     .with_max_context(128_000);
//!
//! let selected = descriptor.select_provider(&ProviderId::from("openai"));
//! assert_eq!(selected.model_rewrite.as_deref(), Some("gpt-4o-2024-08-06"));
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Deserialize;

use crate::{ProviderError, ProviderFuture, ProviderId, SecretString};

/// One backend eligible to serve a model.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ModelProvider {
    /// Configured channel to build a dedicated client from, when set.
    #[serde(default, rename = "id")]
    pub channel_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    /// Model id to send upstream instead of the requested one.
    #[serde(default)]
    pub model_rewrite: Option<String>,
}

impl ModelProvider {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_channel(mut self, channel_id: i64) -> Self {
        self.channel_id = Some(channel_id);
        self
    }

    pub fn with_model_rewrite(mut self, model: impl Into<String>) -> Self {
        self.model_rewrite = Some(model.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ModelMeta {
    /// Context override in tokens; `0` defers to the backend.
    #[serde(default)]
    pub max_context: usize,
    /// System prompt that is always sent ahead of the caller's own.
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub restricted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ModelDescriptor {
    pub model_id: String,
    #[serde(default)]
    pub providers: Vec<ModelProvider>,
    #[serde(default)]
    pub meta: ModelMeta,
}

impl ModelDescriptor {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Self::default()
        }
    }

    /// Descriptor used when the catalog has no entry for `model_id`.
    pub fn fallback(
        model_id: impl Into<String>,
        default_provider: &ProviderId,
        max_context: usize,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            providers: vec![ModelProvider::named(default_provider.as_str())],
            meta: ModelMeta {
                max_context,
                prompt: None,
                restricted: true,
            },
        }
    }

    pub fn with_provider(mut self, provider: ModelProvider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_max_context(mut self, max_context: usize) -> Self {
        self.meta.max_context = max_context;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.meta.prompt = Some(prompt.into());
        self
    }

    /// First listed provider, or the default provider when none is listed.
    pub fn select_provider(&self, default_provider: &ProviderId) -> ModelProvider {
        self.providers
            .first()
            .cloned()
            .unwrap_or_else(|| ModelProvider::named(default_provider.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ChannelMeta {
    #[serde(default)]
    pub using_proxy: bool,
    #[serde(default)]
    pub openai_azure: bool,
    #[serde(default)]
    pub openai_azure_api_version: Option<String>,
}

/// A configured backend instance: server, credential, and per-channel flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Channel {
    pub id: i64,
    #[serde(rename = "type")]
    pub channel_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub secret: SecretString,
    #[serde(default)]
    pub meta: ChannelMeta,
}

impl Channel {
    pub fn new(id: i64, channel_type: impl Into<String>) -> Self {
        Self {
            id,
            channel_type: channel_type.into(),
            ..Self::default()
        }
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    pub fn with_secret(mut self, secret: impl Into<SecretString>) -> Self {
        self.secret = secret.into();
        self
    }

    pub fn with_meta(mut self, meta: ChannelMeta) -> Self {
        self.meta = meta;
        self
    }
}

pub trait ModelCatalog: Send + Sync {
    fn lookup_model<'a>(&'a self, model_id: &'a str) -> ProviderFuture<'a, Option<ModelDescriptor>>;
}

pub trait ChannelCatalog: Send + Sync {
    fn lookup_channel<'a>(&'a self, channel_id: i64)
    -> ProviderFuture<'a, Result<Channel, ProviderError>>;
}

#[derive(Debug, Default)]
pub struct InMemoryModelCatalog {
    models: Mutex<HashMap<String, ModelDescriptor>>,
}

impl InMemoryModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, descriptor: ModelDescriptor) -> Result<(), ProviderError> {
        self.models
            .lock()
            .map_err(|_| ProviderError::other("model catalog lock poisoned"))?
            .insert(descriptor.model_id.clone(), descriptor);
        Ok(())
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ModelDescriptor>) -> Self {
        let models = descriptors
            .into_iter()
            .map(|descriptor| (descriptor.model_id.clone(), descriptor))
            .collect();

        Self {
            models: Mutex::new(models),
        }
    }
}

impl ModelCatalog for InMemoryModelCatalog {
    fn lookup_model<'a>(&'a self, model_id: &'a str) -> ProviderFuture<'a, Option<ModelDescriptor>> {
        Box::pin(async move { self.models.lock().ok()?.get(model_id).cloned() })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryChannelCatalog {
    channels: Mutex<HashMap<i64, Channel>>,
}

impl InMemoryChannelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, channel: Channel) -> Result<(), ProviderError> {
        self.channels
            .lock()
            .map_err(|_| ProviderError::other("channel catalog lock poisoned"))?
            .insert(channel.id, channel);
        Ok(())
    }

    pub fn from_channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        let channels = channels
            .into_iter()
            .map(|channel| (channel.id, channel))
            .collect();

        Self {
            channels: Mutex::new(channels),
        }
    }
}

impl ChannelCatalog for InMemoryChannelCatalog {
    fn lookup_channel<'a>(
        &'a self,
        channel_id: i64,
    ) -> ProviderFuture<'a, Result<Channel, ProviderError>> {
        Box::pin(async move {
            let channels = self
                .channels
                .lock()
                .map_err(|_| ProviderError::other("channel catalog lock poisoned"))?;

            channels
                .get(&channel_id)
                .cloned()
                .ok_or_else(|| ProviderError::not_found(format!("channel {channel_id} not found")))
        })
    }
}
