//! OpenAI-compatible chat backend over a pluggable transport.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;

use crate::{
    BoxedResponseStream, ChatBackend, ChatRequest, ChatResponse, ProviderError, ProviderFuture,
};

use super::transport::OpenAiTransport;
use super::types::{OpenAiMessage, OpenAiRequest, OpenAiStreamChunk};

const CONTENT_FILTER: &str = "content_filter";

/// Serves every vendor that speaks the OpenAI chat-completions dialect:
/// OpenAI itself, Azure deployments, OneAPI and OpenRouter relays.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleBackend {
    transport: Arc<dyn OpenAiTransport>,
    context_window: Option<usize>,
}

impl OpenAiCompatibleBackend {
    pub fn new(transport: Arc<dyn OpenAiTransport>) -> Self {
        Self {
            transport,
            context_window: None,
        }
    }

    /// Reports `tokens` for every model instead of consulting the known-model table.
    pub fn with_context_window(mut self, tokens: usize) -> Self {
        self.context_window = Some(tokens);
        self
    }

    pub(crate) fn build_openai_request(&self, request: ChatRequest) -> OpenAiRequest {
        OpenAiRequest {
            model: request.model,
            messages: request
                .messages
                .into_iter()
                .map(OpenAiMessage::from)
                .collect(),
            max_tokens: (request.max_tokens > 0).then_some(request.max_tokens),
            stream: request.stream,
        }
    }
}

impl ChatBackend for OpenAiCompatibleBackend {
    fn chat<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>> {
        Box::pin(async move {
            let openai_request = self.build_openai_request(request);
            let response = self.transport.complete(openai_request).await?;

            if response.finish_reason.as_deref() == Some(CONTENT_FILTER) {
                return Err(ProviderError::content_filtered(
                    "response withheld by upstream content filter",
                ));
            }
            Ok(response.into_chat_response())
        })
    }

    fn chat_stream<'a>(
        &'a self,
        request: ChatRequest,
    ) -> ProviderFuture<'a, Result<BoxedResponseStream, ProviderError>> {
        Box::pin(async move {
            let openai_request = self.build_openai_request(request.enable_streaming());
            let mut chunks = self.transport.stream(openai_request).await?;

            let stream = try_stream! {
                while let Some(chunk) = chunks.next().await {
                    match chunk? {
                        OpenAiStreamChunk::Finished { reason, .. } if reason == CONTENT_FILTER => {
                            Err::<(), _>(ProviderError::content_filtered(
                                "response withheld by upstream content filter",
                            ))?;
                        }
                        chunk => yield ChatResponse::from(chunk),
                    }
                }
            };

            Ok(Box::pin(stream) as BoxedResponseStream)
        })
    }

    fn max_context_length<'a>(&'a self, model: &'a str) -> ProviderFuture<'a, usize> {
        Box::pin(async move {
            self.context_window
                .unwrap_or_else(|| known_context_window(model))
        })
    }
}

/// Published input window for well-known OpenAI model families; `0` when unknown.
pub fn known_context_window(model: &str) -> usize {
    let model = model.rsplit('/').next().unwrap_or(model);

    if model.starts_with("gpt-4o")
        || model.starts_with("gpt-4-turbo")
        || model.starts_with("gpt-4.1")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
    {
        128_000
    } else if model.starts_with("gpt-4-32k") {
        32_768
    } else if model.starts_with("gpt-4") {
        8_192
    } else if model.starts_with("gpt-3.5-turbo") {
        16_385
    } else {
        0
    }
}
