//! Model lookup and backend selection with graceful degradation.
//!
//! A provider resolves in three steps: a configured channel (built on demand
//! or matched by channel type), then a registered backend with the provider's
//! name, then the registry default. Misconfiguration is logged and never
//! surfaces to the caller as an error.

use std::sync::Arc;

use sprovider::{
    BackendFactory, BackendFamily, BackendRegistry, ChannelCatalog, ChatBackend, ModelCatalog,
    ModelDescriptor, ModelProvider, ProviderId,
};

use crate::hooks::{NoopRoutingHooks, Route, RoutingHooks};

/// A backend plus the route that selected it.
#[derive(Clone)]
pub struct ResolvedBackend {
    pub backend: Arc<dyn ChatBackend>,
    pub route: Route,
}

impl std::fmt::Debug for ResolvedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedBackend")
            .field("route", &self.route)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct ProviderResolver {
    registry: Arc<BackendRegistry>,
    models: Arc<dyn ModelCatalog>,
    channels: Arc<dyn ChannelCatalog>,
    factory: Option<Arc<dyn BackendFactory>>,
    hooks: Arc<dyn RoutingHooks>,
    default_provider: ProviderId,
    fallback_max_context: usize,
}

impl ProviderResolver {
    pub fn new(
        registry: Arc<BackendRegistry>,
        models: Arc<dyn ModelCatalog>,
        channels: Arc<dyn ChannelCatalog>,
    ) -> Self {
        let default_provider = registry.default_provider().clone();
        Self {
            registry,
            models,
            channels,
            factory: None,
            hooks: Arc::new(NoopRoutingHooks),
            default_provider,
            fallback_max_context: 4000,
        }
    }

    pub fn with_factory(mut self, factory: Arc<dyn BackendFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn RoutingHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Provider assumed for models the catalog does not know.
    pub fn with_default_provider(mut self, provider: impl Into<ProviderId>) -> Self {
        self.default_provider = provider.into();
        self
    }

    pub fn with_fallback_max_context(mut self, tokens: usize) -> Self {
        self.fallback_max_context = tokens;
        self
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn default_provider(&self) -> &ProviderId {
        &self.default_provider
    }

    /// The catalog entry for `model_id`, or a restricted stand-in served by
    /// the default provider.
    pub async fn query_model(&self, model_id: &str) -> ModelDescriptor {
        match self.models.lookup_model(model_id).await {
            Some(descriptor) => descriptor,
            None => ModelDescriptor::fallback(
                model_id,
                &self.default_provider,
                self.fallback_max_context,
            ),
        }
    }

    /// Providers configured for `model_id`, falling back to the default provider.
    pub async fn providers_for(&self, model_id: &str) -> Vec<ModelProvider> {
        let descriptor = self.query_model(model_id).await;
        if descriptor.providers.is_empty() {
            vec![descriptor.select_provider(&self.default_provider)]
        } else {
            descriptor.providers
        }
    }

    pub async fn select_backend(&self, provider: &ModelProvider) -> ResolvedBackend {
        if let Some(resolved) = self.select_channel(provider).await {
            return resolved;
        }

        if let Some(backend) = self.registry.get(&provider.name) {
            return ResolvedBackend {
                backend,
                route: Route::Provider(ProviderId::from(provider.name.as_str())),
            };
        }

        tracing::warn!(
            provider = %provider.name,
            default = %self.registry.default_provider(),
            "unsupported provider, using default backend"
        );
        self.hooks
            .on_provider_fallback(&provider.name, self.registry.default_provider());
        ResolvedBackend {
            backend: self.registry.default_backend(),
            route: Route::Default {
                requested: provider.name.clone(),
            },
        }
    }

    async fn select_channel(&self, provider: &ModelProvider) -> Option<ResolvedBackend> {
        let channel_id = provider.channel_id.filter(|id| *id > 0)?;

        let channel = match self.channels.lookup_channel(channel_id).await {
            Ok(channel) => channel,
            Err(err) => {
                tracing::error!(channel_id, error = %err, "channel lookup failed");
                self.hooks.on_channel_error(channel_id, &err);
                return None;
            }
        };

        if let (Some(family), Some(factory)) =
            (BackendFamily::from_channel_type(&channel.channel_type), &self.factory)
        {
            match factory.build(family, &channel) {
                Ok(backend) => {
                    return Some(ResolvedBackend {
                        backend,
                        route: Route::Channel { channel_id, family },
                    });
                }
                Err(err) => {
                    tracing::error!(
                        channel_id,
                        family = family.as_str(),
                        error = %err,
                        "building channel backend failed"
                    );
                    self.hooks.on_channel_error(channel_id, &err);
                }
            }
        }

        self.registry
            .get(&channel.channel_type)
            .map(|backend| ResolvedBackend {
                backend,
                route: Route::Provider(ProviderId::from(channel.channel_type.as_str())),
            })
    }

    /// Context window for `model_id`: catalog override, then backend report,
    /// then the configured fallback.
    pub async fn max_context_length(&self, model_id: &str) -> usize {
        let descriptor = self.query_model(model_id).await;
        if descriptor.meta.max_context > 0 {
            return descriptor.meta.max_context;
        }

        let provider = descriptor.select_provider(&self.default_provider);
        let resolved = self.select_backend(&provider).await;
        match resolved.backend.max_context_length(model_id).await {
            0 => self.fallback_max_context,
            window => window,
        }
    }
}

impl std::fmt::Debug for ProviderResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderResolver")
            .field("registry", &self.registry)
            .field("default_provider", &self.default_provider)
            .field("has_factory", &self.factory.is_some())
            .field("fallback_max_context", &self.fallback_max_context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use sprovider::{
        BoxedResponseStream, Channel, ChatRequest, ChatResponse, InMemoryChannelCatalog,
        InMemoryModelCatalog, ProviderError, ProviderFuture, providers,
    };

    struct Named {
        name: &'static str,
        window: usize,
    }

    impl ChatBackend for Named {
        fn chat<'a>(
            &'a self,
            _request: ChatRequest,
        ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>> {
            Box::pin(async move { Ok(ChatResponse::text(self.name)) })
        }

        fn chat_stream<'a>(
            &'a self,
            _request: ChatRequest,
        ) -> ProviderFuture<'a, Result<BoxedResponseStream, ProviderError>> {
            Box::pin(async { Err(ProviderError::other("not used")) })
        }

        fn max_context_length<'a>(&'a self, _model: &'a str) -> ProviderFuture<'a, usize> {
            Box::pin(async move { self.window })
        }
    }

    fn named(name: &'static str, window: usize) -> Arc<dyn ChatBackend> {
        Arc::new(Named { name, window })
    }

    /// Builds a `Named` backend tagged with the channel's family.
    struct TaggingFactory;

    impl BackendFactory for TaggingFactory {
        fn build(
            &self,
            family: BackendFamily,
            channel: &Channel,
        ) -> Result<Arc<dyn ChatBackend>, ProviderError> {
            if channel.secret.is_empty() {
                return Err(ProviderError::authentication("missing secret"));
            }
            Ok(named(family.as_str(), 0))
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl RoutingHooks for RecordingHooks {
        fn on_provider_fallback(&self, requested: &str, fallback: &ProviderId) {
            self.events
                .lock()
                .expect("events")
                .push(format!("fallback:{requested}->{fallback}"));
        }

        fn on_channel_error(&self, channel_id: i64, _error: &ProviderError) {
            self.events
                .lock()
                .expect("events")
                .push(format!("channel_error:{channel_id}"));
        }
    }

    fn registry() -> Arc<BackendRegistry> {
        Arc::new(
            BackendRegistry::new(providers::OPENAI, named("openai", 0))
                .with_backend(providers::MOONSHOT, named("moonshot", 0))
                .with_backend(providers::DASHSCOPE, named("dashscope", 16000)),
        )
    }

    fn resolver(hooks: Arc<RecordingHooks>) -> ProviderResolver {
        let channels = InMemoryChannelCatalog::from_channels([
            Channel::new(1, providers::OPENROUTER).with_secret("sk-or"),
            Channel::new(2, providers::OPENAI),
            Channel::new(3, providers::MOONSHOT),
            Channel::new(4, "carrier-pigeon"),
        ]);
        let models = InMemoryModelCatalog::from_descriptors([
            ModelDescriptor::new("pinned")
                .with_provider(ModelProvider::named(providers::DASHSCOPE))
                .with_max_context(8000),
            ModelDescriptor::new("qwen-max").with_provider(ModelProvider::named(providers::DASHSCOPE)),
            ModelDescriptor::new("kimi").with_provider(ModelProvider::named(providers::MOONSHOT)),
        ]);

        ProviderResolver::new(registry(), Arc::new(models), Arc::new(channels))
            .with_factory(Arc::new(TaggingFactory))
            .with_hooks(hooks)
    }

    async fn answer(resolved: &ResolvedBackend) -> String {
        resolved
            .backend
            .chat(ChatRequest::new("m", Vec::new()))
            .await
            .expect("chat")
            .text
    }

    #[tokio::test]
    async fn dynamic_channel_types_are_built_by_the_factory() {
        let resolver = resolver(Arc::default());
        let resolved = resolver
            .select_backend(&ModelProvider::named("ignored").with_channel(1))
            .await;

        assert_eq!(
            resolved.route,
            Route::Channel {
                channel_id: 1,
                family: BackendFamily::OpenRouter
            }
        );
        assert_eq!(answer(&resolved).await, "openrouter");
    }

    #[tokio::test]
    async fn other_channel_types_resolve_through_the_registry() {
        let resolver = resolver(Arc::default());
        let resolved = resolver
            .select_backend(&ModelProvider::named(providers::OPENAI).with_channel(3))
            .await;

        assert_eq!(resolved.route, Route::Provider(ProviderId::from(providers::MOONSHOT)));
        assert_eq!(answer(&resolved).await, "moonshot");
    }

    #[tokio::test]
    async fn failed_channel_build_degrades_to_channel_type() {
        let hooks = Arc::new(RecordingHooks::default());
        let resolver = resolver(Arc::clone(&hooks));

        // Channel 2 has no secret, so the factory refuses it.
        let resolved = resolver
            .select_backend(&ModelProvider::named(providers::MOONSHOT).with_channel(2))
            .await;

        assert_eq!(resolved.route, Route::Provider(ProviderId::from(providers::OPENAI)));
        assert_eq!(
            hooks.events.lock().expect("events").as_slice(),
            ["channel_error:2"]
        );
    }

    #[tokio::test]
    async fn missing_channel_degrades_to_provider_name() {
        let hooks = Arc::new(RecordingHooks::default());
        let resolver = resolver(Arc::clone(&hooks));

        let resolved = resolver
            .select_backend(&ModelProvider::named(providers::MOONSHOT).with_channel(99))
            .await;
        assert_eq!(answer(&resolved).await, "moonshot");

        let unknown_type = resolver
            .select_backend(&ModelProvider::named(providers::DASHSCOPE).with_channel(4))
            .await;
        assert_eq!(answer(&unknown_type).await, "dashscope");

        assert_eq!(
            hooks.events.lock().expect("events").as_slice(),
            ["channel_error:99"]
        );
    }

    #[tokio::test]
    async fn unknown_provider_uses_the_default_backend() {
        let hooks = Arc::new(RecordingHooks::default());
        let resolver = resolver(Arc::clone(&hooks));

        let resolved = resolver.select_backend(&ModelProvider::named("nonexistent")).await;
        assert_eq!(
            resolved.route,
            Route::Default {
                requested: "nonexistent".to_string()
            }
        );
        assert_eq!(answer(&resolved).await, "openai");

        // A zero channel id is treated as no channel.
        let resolved = resolver
            .select_backend(&ModelProvider::named(providers::MOONSHOT).with_channel(0))
            .await;
        assert_eq!(answer(&resolved).await, "moonshot");

        assert_eq!(
            hooks.events.lock().expect("events").as_slice(),
            ["fallback:nonexistent->openai"]
        );
    }

    #[tokio::test]
    async fn unknown_channel_type_and_provider_fall_back_to_default() {
        let hooks = Arc::new(RecordingHooks::default());
        let resolver = resolver(Arc::clone(&hooks));

        // Channel 4 declares an unsupported type that the registry does not know either.
        let resolved = resolver
            .select_backend(&ModelProvider::named("nonexistent").with_channel(4))
            .await;

        assert_eq!(
            resolved.route,
            Route::Default {
                requested: "nonexistent".to_string()
            }
        );
        assert_eq!(answer(&resolved).await, "openai");
        assert_eq!(
            hooks.events.lock().expect("events").as_slice(),
            ["fallback:nonexistent->openai"]
        );
    }

    #[tokio::test]
    async fn unknown_models_get_a_restricted_fallback_descriptor() {
        let resolver = resolver(Arc::default());

        let descriptor = resolver.query_model("mystery").await;
        assert!(descriptor.meta.restricted);
        assert_eq!(descriptor.meta.max_context, 4000);
        assert_eq!(
            resolver.providers_for("mystery").await,
            vec![ModelProvider::named(providers::OPENAI)]
        );
        assert_eq!(
            resolver.providers_for("qwen-max").await,
            vec![ModelProvider::named(providers::DASHSCOPE)]
        );
    }

    #[tokio::test]
    async fn max_context_prefers_metadata_then_backend_then_fallback() {
        let resolver = resolver(Arc::default());

        assert_eq!(resolver.max_context_length("pinned").await, 8000);
        assert_eq!(resolver.max_context_length("qwen-max").await, 16000);
        // moonshot reports 0.
        assert_eq!(resolver.max_context_length("kimi").await, 4000);
        assert_eq!(
            resolver
                .with_fallback_max_context(2048)
                .max_context_length("kimi")
                .await,
            2048
        );
    }
}
