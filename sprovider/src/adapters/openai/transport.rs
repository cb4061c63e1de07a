//! OpenAI-compatible transport trait and reqwest-based HTTP implementation.

use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, Response};

use crate::{ProviderError, ProviderFuture};

use super::serde_api::{
    OpenAiApiResponse, OpenAiApiStreamResponse, build_api_request, error_from_status,
};
use super::types::{OpenAiAuth, OpenAiEndpoint, OpenAiRequest, OpenAiResponse, OpenAiStreamChunk, OpenAiUsage};

pub type OpenAiChunkStream =
    Pin<Box<dyn Stream<Item = Result<OpenAiStreamChunk, ProviderError>> + Send + 'static>>;

pub trait OpenAiTransport: Send + Sync + std::fmt::Debug {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>>;

    fn stream<'a>(
        &'a self,
        request: OpenAiRequest,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiHttpTransport {
    client: Client,
    endpoint: OpenAiEndpoint,
}

impl OpenAiHttpTransport {
    pub fn new(client: Client, endpoint: OpenAiEndpoint) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &OpenAiEndpoint {
        &self.endpoint
    }

    fn build(&self, request: &OpenAiRequest) -> RequestBuilder {
        let url = self.endpoint.chat_url(&request.model);
        let mut builder = match &self.endpoint.auth {
            OpenAiAuth::Bearer(key) => self.client.post(url).bearer_auth(key.expose()),
            OpenAiAuth::Azure { key, .. } => self.client.post(url).header("api-key", key.expose()),
        };

        for (name, value) in &self.endpoint.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    async fn send(&self, request: OpenAiRequest) -> Result<Response, ProviderError> {
        let builder = self.build(&request);
        let api_request = build_api_request(request)?;
        let response = builder.json(&api_request).send().await.map_err(|err| {
            if err.is_timeout() {
                ProviderError::timeout(err.to_string())
            } else {
                ProviderError::transport(err.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_status(status, &body));
        }
        Ok(response)
    }
}

impl OpenAiTransport for OpenAiHttpTransport {
    fn complete<'a>(
        &'a self,
        mut request: OpenAiRequest,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            request.stream = false;
            let response = self.send(request).await?;
            let parsed: OpenAiApiResponse = response
                .json()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            OpenAiResponse::try_from(parsed)
        })
    }

    fn stream<'a>(
        &'a self,
        mut request: OpenAiRequest,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream, ProviderError>> {
        Box::pin(async move {
            request.stream = true;
            let response = self.send(request).await?;

            let stream = try_stream! {
                let mut chunks = response.bytes_stream();
                let mut buffer = Vec::<u8>::new();
                let mut finish_reason = None::<String>;
                let mut usage = OpenAiUsage::default();
                let mut done = false;

                while let Some(item) = chunks.next().await {
                    let bytes = item.map_err(|err| ProviderError::transport(err.to_string()))?;
                    buffer.extend_from_slice(&bytes);

                    // Split on raw bytes so multi-byte characters spanning chunks stay intact.
                    while let Some(newline) = buffer.iter().position(|byte| *byte == b'\n') {
                        let line = buffer.drain(..=newline).collect::<Vec<u8>>();
                        let line = std::str::from_utf8(&line)
                            .map_err(|err| ProviderError::transport(err.to_string()))?;

                        match parse_sse_line(line)? {
                            SseLine::Skip => {}
                            SseLine::Done => {
                                done = true;
                                break;
                            }
                            SseLine::Event(event) => {
                                if let Some(event_usage) = event.usage {
                                    usage = event_usage.into();
                                }
                                for choice in event.choices {
                                    if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                                        yield OpenAiStreamChunk::TextDelta(content);
                                    }
                                    if choice.finish_reason.is_some() {
                                        finish_reason = choice.finish_reason;
                                    }
                                }
                            }
                        }
                    }

                    if done {
                        break;
                    }
                }

                let reason = match (finish_reason, done) {
                    (Some(reason), _) => reason,
                    (None, true) => "stop".to_string(),
                    (None, false) => Err::<String, ProviderError>(ProviderError::transport(
                        "stream closed before [DONE] or a finish reason",
                    ))?,
                };
                yield OpenAiStreamChunk::Finished { reason, usage };
            };

            Ok(Box::pin(stream) as OpenAiChunkStream)
        })
    }
}

#[derive(Debug)]
pub(crate) enum SseLine {
    Skip,
    Done,
    Event(OpenAiApiStreamResponse),
}

pub(crate) fn parse_sse_line(line: &str) -> Result<SseLine, ProviderError> {
    let line = line.trim();
    let Some(payload) = line.strip_prefix("data:") else {
        return Ok(SseLine::Skip);
    };

    let payload = payload.trim();
    if payload.is_empty() {
        return Ok(SseLine::Skip);
    }
    if payload == "[DONE]" {
        return Ok(SseLine::Done);
    }

    serde_json::from_str(payload)
        .map(SseLine::Event)
        .map_err(|err| ProviderError::transport(err.to_string()))
}
