//! Focused unit tests for OpenAI-compatible adapter internals.

#![cfg(test)]

use std::sync::{Arc, Mutex};

use futures_util::{StreamExt, stream};
use reqwest::StatusCode;

use crate::{
    ChatBackend, ChatRequest, ContentPart, ImageDetail, Message, ProviderError,
    ProviderErrorKind, ProviderFuture, Role, SecretString,
};

use super::backend::{OpenAiCompatibleBackend, known_context_window};
use super::serde_api::{build_api_request, error_from_status};
use super::transport::{OpenAiChunkStream, OpenAiTransport, SseLine, parse_sse_line};
use super::types::{
    OpenAiAuth, OpenAiContent, OpenAiEndpoint, OpenAiMessage, OpenAiPart, OpenAiRequest,
    OpenAiResponse, OpenAiStreamChunk, OpenAiUsage,
};

#[derive(Debug, Default)]
struct ScriptedTransport {
    finish_reason: Option<String>,
    chunks: Vec<OpenAiStreamChunk>,
    seen: Mutex<Vec<OpenAiRequest>>,
}

impl OpenAiTransport for ScriptedTransport {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            let model = request.model.clone();
            self.seen.lock().expect("lock").push(request);
            Ok(OpenAiResponse {
                model,
                content: "pong".to_string(),
                finish_reason: self.finish_reason.clone(),
                usage: OpenAiUsage {
                    prompt_tokens: 7,
                    completion_tokens: 1,
                },
            })
        })
    }

    fn stream<'a>(
        &'a self,
        request: OpenAiRequest,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream, ProviderError>> {
        Box::pin(async move {
            self.seen.lock().expect("lock").push(request);
            let items = self.chunks.clone().into_iter().map(Ok).collect::<Vec<_>>();
            Ok(Box::pin(stream::iter(items)) as OpenAiChunkStream)
        })
    }
}

fn user_request(model: &str) -> ChatRequest {
    ChatRequest::new(model, vec![Message::user("ping")])
}

#[test]
fn chat_url_targets_azure_deployment_without_dots() {
    let endpoint = OpenAiEndpoint::new(
        "https://example.openai.azure.com/",
        OpenAiAuth::Azure {
            key: SecretString::from("k"),
            api_version: "2024-02-01".to_string(),
        },
    );

    assert_eq!(
        endpoint.chat_url("gpt-3.5-turbo"),
        "https://example.openai.azure.com/openai/deployments/gpt-35-turbo/chat/completions?api-version=2024-02-01"
    );

    let plain = OpenAiEndpoint::new("https://api.openai.com/v1/", OpenAiAuth::Bearer("k".into()));
    assert_eq!(plain.chat_url("gpt-4o"), "https://api.openai.com/v1/chat/completions");
}

#[test]
fn message_with_parts_drops_file_attachments() {
    let message = Message::user("look").with_parts(vec![
        ContentPart::text("what is this"),
        ContentPart::image_with_detail("https://img/1.png", ImageDetail::Low),
        ContentPart::file("https://files/a.pdf", "a.pdf"),
    ]);

    let converted = OpenAiMessage::from(message);
    assert_eq!(converted.role, Role::User);
    assert_eq!(
        converted.content,
        OpenAiContent::Parts(vec![
            OpenAiPart::Text("what is this".to_string()),
            OpenAiPart::Image {
                url: "https://img/1.png".to_string(),
                detail: Some(ImageDetail::Low),
            },
        ])
    );

    let plain = OpenAiMessage::from(Message::assistant("hi"));
    assert_eq!(plain.content, OpenAiContent::Text("hi".to_string()));
}

#[test]
fn api_request_serializes_parts_in_wire_shape() {
    let request = OpenAiRequest {
        model: "gpt-4o".to_string(),
        messages: vec![OpenAiMessage {
            role: Role::User,
            content: OpenAiContent::Parts(vec![OpenAiPart::Image {
                url: "https://img/2.png".to_string(),
                detail: Some(ImageDetail::High),
            }]),
        }],
        max_tokens: None,
        stream: false,
    };

    let value = serde_json::to_value(build_api_request(request).expect("builds")).expect("json");
    assert_eq!(value["messages"][0]["role"], "user");
    assert_eq!(value["messages"][0]["content"][0]["type"], "image_url");
    assert_eq!(value["messages"][0]["content"][0]["image_url"]["detail"], "high");
    assert!(value.get("max_tokens").is_none());
}

#[test]
fn api_request_rejects_empty_conversation() {
    let request = OpenAiRequest {
        model: "gpt-4o".to_string(),
        messages: Vec::new(),
        max_tokens: Some(16),
        stream: false,
    };

    let error = build_api_request(request).expect_err("empty request must fail");
    assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
}

#[test]
fn error_status_mapping_recognizes_content_filter_code() {
    let body = r#"{"error":{"message":"flagged","code":"content_filter"}}"#;
    let error = error_from_status(StatusCode::BAD_REQUEST, body);
    assert_eq!(error.kind, ProviderErrorKind::ContentFiltered);
    assert_eq!(error.message, "flagged");

    let throttled = error_from_status(StatusCode::TOO_MANY_REQUESTS, "not json");
    assert_eq!(throttled.kind, ProviderErrorKind::RateLimited);
    assert!(throttled.message.contains("429"));
}

#[test]
fn sse_lines_parse_into_events() {
    assert!(matches!(parse_sse_line(": keep-alive").expect("comment"), SseLine::Skip));
    assert!(matches!(parse_sse_line("data: [DONE]\n").expect("done"), SseLine::Done));

    let line = r#"data: {"choices":[{"delta":{"content":"你好"},"finish_reason":null}]}"#;
    let SseLine::Event(event) = parse_sse_line(line).expect("event") else {
        panic!("expected an event line");
    };
    assert_eq!(event.choices[0].delta.content.as_deref(), Some("你好"));

    assert!(parse_sse_line("data: {broken").is_err());
}

#[test]
fn known_context_window_covers_common_families() {
    assert_eq!(known_context_window("gpt-4o-mini"), 128_000);
    assert_eq!(known_context_window("openai/gpt-4o"), 128_000);
    assert_eq!(known_context_window("gpt-4-32k-0613"), 32_768);
    assert_eq!(known_context_window("gpt-4"), 8_192);
    assert_eq!(known_context_window("gpt-3.5-turbo"), 16_385);
    assert_eq!(known_context_window("qwen-max"), 0);
}

#[tokio::test]
async fn chat_maps_response_and_omits_zero_max_tokens() {
    let transport = Arc::new(ScriptedTransport::default());
    let backend = OpenAiCompatibleBackend::new(transport.clone());

    let response = backend.chat(user_request("gpt-4o")).await.expect("chat succeeds");
    assert_eq!(response.text, "pong");
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!((response.input_tokens, response.output_tokens), (7, 1));

    let seen = transport.seen.lock().expect("lock");
    assert_eq!(seen[0].max_tokens, None);
    assert!(!seen[0].stream);
}

#[tokio::test]
async fn chat_reports_content_filter_as_error() {
    let transport = Arc::new(ScriptedTransport {
        finish_reason: Some("content_filter".to_string()),
        ..ScriptedTransport::default()
    });
    let backend = OpenAiCompatibleBackend::new(transport);

    let error = backend
        .chat(user_request("gpt-4o"))
        .await
        .expect_err("filtered response must fail");
    assert_eq!(error.kind, ProviderErrorKind::ContentFiltered);
}

#[tokio::test]
async fn chat_stream_forwards_deltas_then_finish() {
    let transport = Arc::new(ScriptedTransport {
        chunks: vec![
            OpenAiStreamChunk::TextDelta("Hel".to_string()),
            OpenAiStreamChunk::TextDelta("lo".to_string()),
            OpenAiStreamChunk::Finished {
                reason: "stop".to_string(),
                usage: OpenAiUsage::default(),
            },
        ],
        ..ScriptedTransport::default()
    });
    let backend = OpenAiCompatibleBackend::new(transport.clone());

    let stream = backend
        .chat_stream(user_request("gpt-4o").with_max_tokens(64))
        .await
        .expect("stream opens");
    let items = stream.collect::<Vec<_>>().await;

    let texts = items
        .iter()
        .map(|item| item.as_ref().expect("ok item").text.clone())
        .collect::<Vec<_>>();
    assert_eq!(texts, vec!["Hel", "lo", ""]);
    assert!(items[2].as_ref().expect("ok").is_terminal());

    let seen = transport.seen.lock().expect("lock");
    assert!(seen[0].stream);
    assert_eq!(seen[0].max_tokens, Some(64));
}

#[tokio::test]
async fn chat_stream_turns_filtered_finish_into_error() {
    let transport = Arc::new(ScriptedTransport {
        chunks: vec![
            OpenAiStreamChunk::TextDelta("partial".to_string()),
            OpenAiStreamChunk::Finished {
                reason: "content_filter".to_string(),
                usage: OpenAiUsage::default(),
            },
        ],
        ..ScriptedTransport::default()
    });
    let backend = OpenAiCompatibleBackend::new(transport);

    let items = backend
        .chat_stream(user_request("gpt-4o"))
        .await
        .expect("stream opens")
        .collect::<Vec<_>>()
        .await;

    assert_eq!(items.len(), 2);
    let error = items[1].as_ref().expect_err("filter error");
    assert_eq!(error.kind, ProviderErrorKind::ContentFiltered);
}

#[tokio::test]
async fn explicit_context_window_overrides_table() {
    let backend = OpenAiCompatibleBackend::new(Arc::new(ScriptedTransport::default()))
        .with_context_window(32_000);

    assert_eq!(backend.max_context_length("qwen-max").await, 32_000);
}
