//! The gateway facade: one `ChatBackend` that routes every request to the
//! right vendor backend after normalizing it.

use std::sync::Arc;

use sprovider::{
    BackendFactory, BackendRegistry, BoxedResponseStream, ChannelCatalog, ChatBackend, ChatRequest,
    ChatResponse, InMemoryChannelCatalog, InMemoryModelCatalog, ModelCatalog, ModelProvider,
    ProviderError, ProviderFuture,
};

use crate::alternation::fix;
use crate::normalize::{QuirkSet, initialize, merge_mandatory_prompt, rewrite_content};
use crate::resolver::{ProviderResolver, ResolvedBackend};
use crate::tokens::{ContextReducer, TiktokenTokenizer, TokenBudgetReducer, Tokenizer};
use crate::{ChatError, ContextFitter, FittedRequest, GatewayConfig, NoopRoutingHooks, RoutingHooks};

#[derive(Clone)]
pub struct ChatService {
    resolver: ProviderResolver,
    fitter: ContextFitter,
    quirks: QuirkSet,
    config: GatewayConfig,
    hooks: Arc<dyn RoutingHooks>,
}

impl ChatService {
    pub fn builder(registry: Arc<BackendRegistry>) -> ChatServiceBuilder {
        ChatServiceBuilder::new(registry)
    }

    pub fn resolver(&self) -> &ProviderResolver {
        &self.resolver
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Inbound cleanup for a caller request. See [`initialize`].
    pub fn initialize(&self, request: ChatRequest) -> ChatRequest {
        initialize(request, &self.quirks)
    }

    /// Normalizes and trims a caller request for dispatch through this service.
    ///
    /// Runs [`initialize`] once, so the result must not be prepared again.
    pub async fn prepare(
        &self,
        request: ChatRequest,
        max_context_messages: usize,
        max_token_count: usize,
    ) -> Result<FittedRequest, ChatError> {
        let request = self.initialize(request);
        let model = request.model.clone();

        match self
            .fitter
            .fit(request, self, max_context_messages, max_token_count)
            .await
        {
            Ok(fitted) => {
                tracing::debug!(
                    model = %model,
                    messages = fitted.request.messages.len(),
                    input_tokens = fitted.input_tokens,
                    "context fitted"
                );
                self.hooks
                    .on_context_fitted(&model, fitted.request.messages.len(), fitted.input_tokens);
                Ok(fitted)
            }
            Err(err) => {
                tracing::debug!(model = %model, error = %err, "context rejected");
                self.hooks.on_context_rejected(&model, &err);
                Err(err)
            }
        }
    }

    pub async fn providers_for(&self, model: &str) -> Vec<ModelProvider> {
        self.resolver.providers_for(model).await
    }

    /// Applies content rewrites, the model's provider and prompt settings, and
    /// role alternation. Returns the request to send and the provider chosen.
    pub async fn fix_request(&self, request: ChatRequest) -> (ChatRequest, ModelProvider) {
        let mut request = request;
        let messages = std::mem::take(&mut request.messages);
        let messages = rewrite_content(messages, &self.config.content_rewrites);

        let descriptor = self.resolver.query_model(&request.model).await;
        let provider = descriptor.select_provider(self.resolver.default_provider());
        if let Some(rewrite) = provider.model_rewrite.as_deref().filter(|m| !m.is_empty()) {
            request.model = rewrite.to_string();
        }

        let messages = merge_mandatory_prompt(messages, descriptor.meta.prompt.as_deref());
        request.messages = fix(messages);
        (request, provider)
    }

    async fn route(&self, request: ChatRequest, stream: bool) -> (ChatRequest, ResolvedBackend) {
        let (request, provider) = self.fix_request(request.purify()).await;
        let resolved = self.resolver.select_backend(&provider).await;

        if stream {
            tracing::debug!(
                model = %request.model,
                route = %resolved.route,
                messages = ?request.messages.redact_for_log(self.config.log_redact_chars),
                "dispatching stream request"
            );
        }
        self.hooks.on_dispatch(&request.model, &resolved.route, stream);
        (request, resolved)
    }
}

impl ChatBackend for ChatService {
    fn chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>> {
        Box::pin(async move {
            let (request, resolved) = self.route(request, false).await;
            resolved.backend.chat(request).await
        })
    }

    fn chat_stream<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<BoxedResponseStream, ProviderError>> {
        Box::pin(async move {
            let (request, resolved) = self.route(request, true).await;
            resolved.backend.chat_stream(request).await
        })
    }

    fn max_context_length<'a>(&'a self, model: &'a str) -> ProviderFuture<'a, usize> {
        Box::pin(self.resolver.max_context_length(model))
    }
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("resolver", &self.resolver)
            .field("fitter", &self.fitter)
            .field("quirks", &self.quirks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

pub struct ChatServiceBuilder {
    registry: Arc<BackendRegistry>,
    models: Option<Arc<dyn ModelCatalog>>,
    channels: Option<Arc<dyn ChannelCatalog>>,
    factory: Option<Arc<dyn BackendFactory>>,
    tokenizer: Option<Arc<dyn Tokenizer>>,
    reducer: Option<Arc<dyn ContextReducer>>,
    hooks: Arc<dyn RoutingHooks>,
    config: GatewayConfig,
}

impl ChatServiceBuilder {
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self {
            registry,
            models: None,
            channels: None,
            factory: None,
            tokenizer: None,
            reducer: None,
            hooks: Arc::new(NoopRoutingHooks),
            config: GatewayConfig::default(),
        }
    }

    pub fn model_catalog(mut self, models: Arc<dyn ModelCatalog>) -> Self {
        self.models = Some(models);
        self
    }

    pub fn channel_catalog(mut self, channels: Arc<dyn ChannelCatalog>) -> Self {
        self.channels = Some(channels);
        self
    }

    pub fn backend_factory(mut self, factory: Arc<dyn BackendFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Defaults to [`TiktokenTokenizer`].
    pub fn tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Defaults to a [`TokenBudgetReducer`] over the configured tokenizer.
    pub fn reducer(mut self, reducer: Arc<dyn ContextReducer>) -> Self {
        self.reducer = Some(reducer);
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn RoutingHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ChatService, ChatError> {
        let tokenizer: Arc<dyn Tokenizer> = match self.tokenizer {
            Some(tokenizer) => tokenizer,
            None => Arc::new(TiktokenTokenizer::new()?),
        };
        let reducer = self
            .reducer
            .unwrap_or_else(|| Arc::new(TokenBudgetReducer::new(Arc::clone(&tokenizer))));
        let models = self
            .models
            .unwrap_or_else(|| Arc::new(InMemoryModelCatalog::new()));
        let channels = self
            .channels
            .unwrap_or_else(|| Arc::new(InMemoryChannelCatalog::new()));

        let mut resolver = ProviderResolver::new(self.registry, models, channels)
            .with_hooks(Arc::clone(&self.hooks))
            .with_default_provider(self.config.default_provider.as_str())
            .with_fallback_max_context(self.config.fallback_max_context);
        if let Some(factory) = self.factory {
            resolver = resolver.with_factory(factory);
        }

        Ok(ChatService {
            resolver,
            fitter: ContextFitter::new(tokenizer, reducer).with_limits(self.config.limits),
            quirks: self.config.quirks(),
            config: self.config,
            hooks: self.hooks,
        })
    }
}

impl std::fmt::Debug for ChatServiceBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatServiceBuilder")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
