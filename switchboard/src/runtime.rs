//! Runtime wiring: turns a JSON gateway description into a ready [`ChatService`].
//!
//! ```rust
//! use switchboard::SwitchboardConfig;
//!
//! let config = SwitchboardConfig::from_json_str(
//!     r#"{
//!         "gateway": {"default_provider": "openai"},
//!         "backends": [
//!             {"provider": "openai", "server": "https://api.openai.com/v1", "secret": "sk-1"},
//!             {"provider": "moonshot", "server": "https://api.moonshot.cn/v1", "secret": "sk-2"}
//!         ],
//!         "models": [{"model_id": "kimi", "providers": [{"name": "moonshot"}]}]
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.backends.len(), 2);
//! assert_eq!(config.models[0].providers[0].name, "moonshot");
//! ```

use std::sync::Arc;

use serde::Deserialize;

use crate::{
    BackendRegistry, Channel, ChannelMeta, ChatError, ChatService, FanoutRoutingHooks,
    GatewayConfig, HttpBackendConfig, MetricsRoutingHooks, ModelDescriptor, RoutingHooks,
    SafeRoutingHooks, SecretString, TracingRoutingHooks,
};

/// One preconfigured backend, reachable by provider name.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendPoolEntry {
    pub provider: String,
    /// OpenAI-compatible family used to talk to the backend; defaults to `openai`.
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub secret: SecretString,
    #[serde(default)]
    pub meta: ChannelMeta,
}

impl BackendPoolEntry {
    pub fn new(
        provider: impl Into<String>,
        server: impl Into<String>,
        secret: impl Into<SecretString>,
    ) -> Self {
        Self {
            provider: provider.into(),
            family: None,
            server: server.into(),
            secret: secret.into(),
            meta: ChannelMeta::default(),
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    fn as_channel(&self) -> Channel {
        let family = self.family.as_deref().unwrap_or(crate::providers::OPENAI);
        let mut channel = Channel::new(0, family)
            .with_server(self.server.as_str())
            .with_secret(self.secret.clone())
            .with_meta(self.meta.clone());
        channel.name = self.provider.clone();
        channel
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SwitchboardConfig {
    pub gateway: GatewayConfig,
    pub http: HttpBackendConfig,
    pub backends: Vec<BackendPoolEntry>,
    pub models: Vec<ModelDescriptor>,
    pub channels: Vec<Channel>,
}

impl SwitchboardConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ChatError> {
        serde_json::from_str(json)
            .map_err(|err| ChatError::invalid_configuration(format!("switchboard config: {err}")))
    }
}

/// Tracing and metrics hooks, each isolated from panics.
pub fn default_hooks() -> Arc<dyn RoutingHooks> {
    Arc::new(
        FanoutRoutingHooks::new()
            .with(SafeRoutingHooks::new(TracingRoutingHooks))
            .with(SafeRoutingHooks::new(MetricsRoutingHooks)),
    )
}

/// A service over a prebuilt registry with default catalogs, config, and hooks.
pub fn chat_service(registry: Arc<BackendRegistry>) -> Result<ChatService, ChatError> {
    ChatService::builder(registry).hooks(default_hooks()).build()
}

#[cfg(feature = "backend-openai-compatible")]
pub use http::{build_gateway, build_registry, gateway_from_json};

#[cfg(feature = "backend-openai-compatible")]
mod http {
    use std::sync::Arc;

    use crate::{
        BackendFactory, BackendFamily, BackendRegistry, ChatBackend, ChatError, ChatService,
        HttpBackendFactory, InMemoryChannelCatalog, InMemoryModelCatalog,
    };

    use super::{SwitchboardConfig, default_hooks};

    /// Builds one OpenAI-compatible backend per pool entry.
    ///
    /// The gateway's default provider must be among the entries.
    pub fn build_registry(
        config: &SwitchboardConfig,
        factory: &HttpBackendFactory,
    ) -> Result<BackendRegistry, ChatError> {
        let mut default_backend = None;
        let mut named = Vec::with_capacity(config.backends.len());

        for entry in &config.backends {
            let channel = entry.as_channel();
            let family = BackendFamily::from_channel_type(&channel.channel_type).ok_or_else(|| {
                ChatError::invalid_configuration(format!(
                    "backend {}: unsupported family {}",
                    entry.provider, channel.channel_type
                ))
            })?;
            let backend: Arc<dyn ChatBackend> = factory.build(family, &channel).map_err(|err| {
                ChatError::invalid_configuration(format!("backend {}: {err}", entry.provider))
            })?;

            if entry.provider == config.gateway.default_provider {
                default_backend = Some(Arc::clone(&backend));
            }
            named.push((entry.provider.clone(), backend));
        }

        let default_backend = default_backend.ok_or_else(|| {
            ChatError::invalid_configuration(format!(
                "default provider {} has no configured backend",
                config.gateway.default_provider
            ))
        })?;

        let mut registry =
            BackendRegistry::new(config.gateway.default_provider.as_str(), default_backend);
        for (provider, backend) in named {
            if provider != config.gateway.default_provider {
                registry.register(provider, backend);
            }
        }
        Ok(registry)
    }

    pub fn build_gateway(config: SwitchboardConfig) -> Result<ChatService, ChatError> {
        let factory = HttpBackendFactory::new(config.http.clone())
            .map_err(|err| ChatError::invalid_configuration(format!("http client: {err}")))?;
        let registry = build_registry(&config, &factory)?;

        ChatService::builder(Arc::new(registry))
            .model_catalog(Arc::new(InMemoryModelCatalog::from_descriptors(config.models)))
            .channel_catalog(Arc::new(InMemoryChannelCatalog::from_channels(config.channels)))
            .backend_factory(Arc::new(factory))
            .hooks(default_hooks())
            .config(config.gateway)
            .build()
    }

    pub fn gateway_from_json(json: &str) -> Result<ChatService, ChatError> {
        build_gateway(SwitchboardConfig::from_json_str(json)?)
    }
}
