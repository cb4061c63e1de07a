//! OpenAI-compatible adapter types and gateway-model conversion logic.

use scommon::MetadataMap;

use crate::{ChatResponse, ContentPart, ImageDetail, Message, Role, SecretString};

/// How the credential is presented upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAiAuth {
    Bearer(SecretString),
    /// Azure OpenAI: `api-key` header, deployment-scoped URL, `api-version` query.
    Azure {
        key: SecretString,
        api_version: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiEndpoint {
    pub base_url: String,
    pub auth: OpenAiAuth,
    pub headers: MetadataMap,
}

impl OpenAiEndpoint {
    pub fn new(base_url: impl Into<String>, auth: OpenAiAuth) -> Self {
        Self {
            base_url: base_url.into(),
            auth,
            headers: MetadataMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn chat_url(&self, model: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        match &self.auth {
            OpenAiAuth::Bearer(_) => format!("{base}/chat/completions"),
            OpenAiAuth::Azure { api_version, .. } => format!(
                "{base}/openai/deployments/{}/chat/completions?api-version={api_version}",
                azure_deployment(model)
            ),
        }
    }
}

// Azure deployment names cannot contain '.' or ':'.
fn azure_deployment(model: &str) -> String {
    model.chars().filter(|ch| *ch != '.' && *ch != ':').collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiMessage {
    pub role: Role,
    pub content: OpenAiContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAiContent {
    Text(String),
    Parts(Vec<OpenAiPart>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAiPart {
    Text(String),
    Image {
        url: String,
        detail: Option<ImageDetail>,
    },
}

impl From<Message> for OpenAiMessage {
    fn from(value: Message) -> Self {
        let parts = value
            .parts
            .into_iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(OpenAiPart::Text(text)),
                ContentPart::ImageUrl { image_url } => Some(OpenAiPart::Image {
                    url: image_url.url,
                    detail: image_url.detail,
                }),
                ContentPart::File { .. } | ContentPart::Unsupported => None,
            })
            .collect::<Vec<_>>();

        let content = if parts.is_empty() {
            OpenAiContent::Text(value.content)
        } else {
            OpenAiContent::Parts(parts)
        };

        Self {
            role: value.role,
            content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenAiUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiResponse {
    pub model: String,
    pub content: String,
    pub finish_reason: Option<String>,
    pub usage: OpenAiUsage,
}

impl OpenAiResponse {
    pub fn into_chat_response(self) -> ChatResponse {
        ChatResponse {
            text: self.content,
            finish_reason: Some(self.finish_reason.unwrap_or_else(|| "stop".to_string())),
            input_tokens: self.usage.prompt_tokens,
            output_tokens: self.usage.completion_tokens,
            ..ChatResponse::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAiStreamChunk {
    TextDelta(String),
    Finished { reason: String, usage: OpenAiUsage },
}

impl From<OpenAiStreamChunk> for ChatResponse {
    fn from(value: OpenAiStreamChunk) -> Self {
        match value {
            OpenAiStreamChunk::TextDelta(text) => ChatResponse::text(text),
            OpenAiStreamChunk::Finished { reason, usage } => ChatResponse::finished(reason)
                .with_usage(usage.prompt_tokens, usage.completion_tokens),
        }
    }
}
