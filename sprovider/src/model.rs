//! Vendor-agnostic conversation, request, and response types.
//!
//! The serde shapes are the public wire contract shared with existing callers:
//! multi-modal parts travel as `multipart_content`, and the room id may still
//! arrive in the legacy `n` slot (see [`ChatRequest::migrate_legacy_room_slot`]).
//!
//! ```rust
//! use sprovider::{ChatRequest, ContentPart, Message, Messages, Role};
//!
//! let messages = Messages::from(vec![
//!     Message::user("describe this").with_parts(vec![
//!         ContentPart::text("describe this"),
//!         ContentPart::image("https://example.com/cat.png"),
//!         ContentPart::file("https://example.com/notes.pdf", "notes.pdf"),
//!     ]),
//! ]);
//!
//! let request = ChatRequest::new("gpt-4o", messages).purify();
//! assert_eq!(request.messages[0].role, Role::User);
//! assert_eq!(request.messages[0].parts.len(), 2);
//! assert!(request.messages.has_image());
//! ```

use std::fmt::{Display, Formatter};
use std::ops::Deref;

use scommon::truncate_chars;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image processing level requested from vision-capable backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Low,
    High,
    Auto,
}

impl ImageDetail {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::High => "high",
            Self::Auto => "auto",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "high" => Some(Self::High),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageUrl {
    /// Either a fetchable URL or inline base64 image data.
    #[serde(default)]
    pub url: String,
    #[serde(
        default,
        deserialize_with = "lenient_detail",
        skip_serializing_if = "Option::is_none"
    )]
    pub detail: Option<ImageDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileUrl {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
}

/// One element of a multi-modal message.
///
/// Only `Text` and `ImageUrl` may be dispatched to a backend. `File` parts are
/// upload-only and `Unsupported` captures any tag this crate does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "image_url")]
    ImageUrl {
        #[serde(default)]
        image_url: ImageUrl,
    },
    #[serde(rename = "file")]
    File {
        #[serde(default)]
        file_url: FileUrl,
    },
    #[serde(rename = "unsupported")]
    #[serde(other)]
    Unsupported,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl {
                url: url.into(),
                detail: None,
            },
        }
    }

    pub fn image_with_detail(url: impl Into<String>, detail: ImageDetail) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl {
                url: url.into(),
                detail: Some(detail),
            },
        }
    }

    pub fn file(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self::File {
            file_url: FileUrl {
                url: url.into(),
                name: name.into(),
            },
        }
    }

    pub fn is_dispatchable(&self) -> bool {
        matches!(self, Self::Text { .. } | Self::ImageUrl { .. })
    }

    fn redacted(&self, limit: usize) -> Self {
        match self {
            Self::Text { text } => Self::Text {
                text: truncate_chars(text, limit),
            },
            Self::ImageUrl { image_url } => Self::ImageUrl {
                image_url: ImageUrl {
                    url: truncate_chars(&image_url.url, limit),
                    detail: image_url.detail,
                },
            },
            Self::File { .. } => Self::File {
                file_url: FileUrl::default(),
            },
            Self::Unsupported => Self::Unsupported,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(
        default,
        rename = "multipart_content",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub parts: Vec<ContentPart>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            parts: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn with_parts(mut self, parts: Vec<ContentPart>) -> Self {
        self.parts = parts;
        self
    }

    /// True when the message has no visible text and no parts at all.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty() && self.parts.is_empty()
    }

    /// First uploaded file attached to this message, if any.
    pub fn uploaded_file(&self) -> Option<&FileUrl> {
        self.parts.iter().find_map(|part| match part {
            ContentPart::File { file_url } if !file_url.url.is_empty() => Some(file_url),
            _ => None,
        })
    }
}

/// Ordered conversation. Order is chronological turn order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Messages(Vec<Message>);

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.0.push(message);
    }

    pub fn into_inner(self) -> Vec<Message> {
        self.0
    }

    /// Drops every part that cannot be dispatched to a backend.
    ///
    /// Message order, roles, and count never change.
    pub fn purify(self) -> Self {
        self.0
            .into_iter()
            .map(|mut message| {
                message.parts.retain(ContentPart::is_dispatchable);
                message
            })
            .collect()
    }

    /// Copy for diagnostics with every text and url truncated to `limit` chars.
    pub fn redact_for_log(&self, limit: usize) -> Self {
        self.0
            .iter()
            .map(|message| Message {
                role: message.role,
                content: truncate_chars(&message.content, limit),
                parts: message
                    .parts
                    .iter()
                    .map(|part| part.redacted(limit))
                    .collect(),
            })
            .collect()
    }

    pub fn has_image(&self) -> bool {
        self.0.iter().flat_map(|message| &message.parts).any(|part| {
            matches!(part, ContentPart::ImageUrl { image_url } if !image_url.url.is_empty())
        })
    }

    /// Splits into `(system, chat)` keeping relative order inside each half.
    pub fn split_system(self) -> (Messages, Messages) {
        let (system, chat): (Vec<_>, Vec<_>) = self
            .0
            .into_iter()
            .partition(|message| message.role == Role::System);
        (Messages(system), Messages(chat))
    }

    pub fn roles(&self) -> Vec<Role> {
        self.0.iter().map(|message| message.role).collect()
    }

    /// Sets `detail` on every image part with a URL but no detail level.
    pub fn with_default_image_detail(mut self, detail: ImageDetail) -> Self {
        for message in &mut self.0 {
            for part in &mut message.parts {
                if let ContentPart::ImageUrl { image_url } = part {
                    if !image_url.url.is_empty() && image_url.detail.is_none() {
                        image_url.detail = Some(detail);
                    }
                }
            }
        }
        self
    }
}

impl Deref for Messages {
    type Target = [Message];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Message>> for Messages {
    fn from(value: Vec<Message>) -> Self {
        Self(value)
    }
}

impl FromIterator<Message> for Messages {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Messages {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Messages {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Extend<Message> for Messages {
    fn extend<I: IntoIterator<Item = Message>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "is_default")]
    pub stream: bool,
    pub model: String,
    #[serde(default)]
    pub messages: Messages,
    #[serde(default, skip_serializing_if = "is_default")]
    pub max_tokens: u32,
    /// Reserved. Legacy callers place the room id here.
    #[serde(default, skip_serializing_if = "is_default")]
    pub n: i64,
    #[serde(default, skip_serializing_if = "is_default")]
    pub history_id: i64,
    #[serde(default, skip_serializing_if = "is_default")]
    pub room_id: i64,
    /// Model chosen by the user for this conversation only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_model: Option<String>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: impl Into<Messages>) -> Self {
        Self {
            model: model.into(),
            messages: messages.into(),
            ..Self::default()
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_room_id(mut self, room_id: i64) -> Self {
        self.room_id = room_id;
        self
    }

    pub fn with_temp_model(mut self, model: impl Into<String>) -> Self {
        self.temp_model = Some(model.into());
        self
    }

    pub fn enable_streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    pub fn purify(mut self) -> Self {
        self.messages = self.messages.purify();
        self
    }

    /// Migration shim (wire v1): promotes a room id sent in the legacy `n`
    /// slot to `room_id` and clears `n`. Remove once callers send `room_id`.
    pub fn migrate_legacy_room_slot(mut self) -> Self {
        if self.n != 0 {
            self.room_id = self.n;
            self.n = 0;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub input_tokens: u32,
    #[serde(default, skip_serializing_if = "is_default")]
    pub output_tokens: u32,
}

impl ChatResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn finished(reason: impl Into<String>) -> Self {
        Self {
            finish_reason: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            error_code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn with_usage(mut self, input_tokens: u32, output_tokens: u32) -> Self {
        self.input_tokens = input_tokens;
        self.output_tokens = output_tokens;
        self
    }

    /// A stream ends on a value carrying a finish reason or an error.
    pub fn is_terminal(&self) -> bool {
        self.finish_reason.is_some() || self.error.is_some()
    }
}

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

// Older clients send `"detail": ""` for "unspecified".
fn lenient_detail<'de, D>(deserializer: D) -> Result<Option<ImageDetail>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(ImageDetail::parse))
}
