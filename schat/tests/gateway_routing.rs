use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use schat::prelude::*;
use sprovider::{
    BackendFactory, BackendFamily, BackendRegistry, BoxedResponseStream, Channel,
    InMemoryChannelCatalog, InMemoryModelCatalog, ModelDescriptor, ModelProvider, ProviderError,
    ProviderFuture, VecResponseStream, providers,
};

/// Answers with its own label so tests can see which backend served a request.
#[derive(Debug)]
struct Labelled {
    label: String,
    seen: Mutex<Vec<ChatRequest>>,
}

impl Labelled {
    fn new(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            seen: Mutex::new(Vec::new()),
        })
    }
}

impl ChatBackend for Labelled {
    fn chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>> {
        Box::pin(async move {
            self.seen.lock().expect("seen").push(request);
            Ok(ChatResponse::text(self.label.clone()))
        })
    }

    fn chat_stream<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<BoxedResponseStream, ProviderError>> {
        Box::pin(async move {
            self.seen.lock().expect("seen").push(request);
            Ok(Box::pin(VecResponseStream::new(vec![
                Ok(ChatResponse::text(self.label.clone())),
                Err(ProviderError::content_filtered("blocked mid-stream")),
            ])) as BoxedResponseStream)
        })
    }

    fn max_context_length<'a>(&'a self, _model: &'a str) -> ProviderFuture<'a, usize> {
        Box::pin(async { 0 })
    }
}

#[derive(Debug)]
struct ChannelFactory;

impl BackendFactory for ChannelFactory {
    fn build(
        &self,
        family: BackendFamily,
        channel: &Channel,
    ) -> Result<Arc<dyn ChatBackend>, ProviderError> {
        let backend: Arc<dyn ChatBackend> =
            Labelled::new(format!("{}@{}", family.as_str(), channel.server));
        Ok(backend)
    }
}

fn service() -> ChatService {
    let registry = BackendRegistry::new(providers::OPENAI, Labelled::new("openai"))
        .with_backend(providers::DASHSCOPE, Labelled::new("dashscope"));
    let models = InMemoryModelCatalog::from_descriptors([
        ModelDescriptor::new("router-gpt")
            .with_provider(ModelProvider::named(providers::OPENAI).with_channel(7)),
        ModelDescriptor::new("qwen").with_provider(ModelProvider::named(providers::DASHSCOPE)),
    ]);
    let channels = InMemoryChannelCatalog::from_channels([Channel::new(7, providers::OPENROUTER)
        .with_server("https://router.example/v1")
        .with_secret("sk-or")]);

    ChatService::builder(Arc::new(registry))
        .model_catalog(Arc::new(models))
        .channel_catalog(Arc::new(channels))
        .backend_factory(Arc::new(ChannelFactory))
        .build()
        .expect("service builds")
}

#[tokio::test]
async fn channel_backed_model_is_served_by_a_built_backend() {
    let response = service()
        .chat(ChatRequest::new("router-gpt", vec![Message::user("hi")]))
        .await
        .expect("chat");

    assert_eq!(response.text, "openrouter@https://router.example/v1");
}

#[tokio::test]
async fn catalog_provider_and_default_route_by_name() {
    let service = service();

    let qwen = service
        .chat(ChatRequest::new("qwen", vec![Message::user("hi")]))
        .await
        .expect("chat");
    assert_eq!(qwen.text, "dashscope");

    let unknown = service
        .chat(ChatRequest::new("brand-new-model", vec![Message::user("hi")]))
        .await
        .expect("chat");
    assert_eq!(unknown.text, "openai");
    assert_eq!(
        service.providers_for("brand-new-model").await,
        vec![ModelProvider::named(providers::OPENAI)]
    );
}

#[tokio::test]
async fn stream_errors_reach_the_caller_after_earlier_values() {
    let stream = service()
        .chat_stream(ChatRequest::new("qwen", vec![Message::user("hi")]))
        .await
        .expect("stream opens");

    let items = stream.collect::<Vec<_>>().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().expect("first value").text, "dashscope");
    let error = items[1].as_ref().expect_err("filtered");
    assert_eq!(ChatError::from(error.clone()).kind, ChatErrorKind::ContentFiltered);
}

#[tokio::test]
async fn prepared_request_dispatches_cleanly() {
    let service = service();
    let request = ChatRequest::new(
        "ns:qwen",
        vec![
            Message::system("be terse"),
            Message::user("first"),
            Message::assistant("reply"),
            Message::user("  "),
            Message::user("second"),
        ],
    );

    let fitted = service.prepare(request, 10, 4000).await.expect("fits");
    assert_eq!(fitted.request.model, "qwen");
    assert_eq!(
        fitted.request.messages.roles(),
        vec![Role::System, Role::User, Role::Assistant, Role::User]
    );
    assert!(fitted.input_tokens > 0);

    let response = service.chat(fitted.request).await.expect("chat");
    assert_eq!(response.text, "dashscope");
}
