//! Token accounting and budget-driven history reduction.

use std::sync::Arc;

use sprovider::{ContentPart, ImageDetail, Message, Messages, Role};
use tiktoken_rs::{CoreBPE, cl100k_base, o200k_base};

use crate::ChatError;

/// Fixed per-message framing cost of the chat-completions format.
pub const MESSAGE_OVERHEAD_TOKENS: usize = 4;
/// Tokens that prime the assistant reply.
pub const REPLY_PRIMER_TOKENS: usize = 3;
/// A 512px low-resolution image.
pub const LOW_DETAIL_IMAGE_TOKENS: usize = 65;
/// Low-resolution pass plus one detailed crop.
pub const HIGH_DETAIL_IMAGE_TOKENS: usize = 129;

pub trait Tokenizer: Send + Sync {
    fn count_text(&self, text: &str, model: &str) -> usize;

    fn count_message(&self, message: &Message, model: &str) -> usize {
        let body = if message.parts.is_empty() {
            self.count_text(&message.content, model)
        } else {
            message
                .parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => self.count_text(text, model),
                    ContentPart::ImageUrl { image_url } => image_tokens(image_url.detail),
                    ContentPart::File { .. } | ContentPart::Unsupported => 0,
                })
                .sum()
        };

        MESSAGE_OVERHEAD_TOKENS + self.count_text(message.role.as_str(), model) + body
    }

    fn count_messages(&self, messages: &[Message], model: &str) -> usize {
        if messages.is_empty() {
            return 0;
        }

        messages
            .iter()
            .map(|message| self.count_message(message, model))
            .sum::<usize>()
            + REPLY_PRIMER_TOKENS
    }
}

/// Images without an explicit detail level are charged as low.
pub fn image_tokens(detail: Option<ImageDetail>) -> usize {
    match detail {
        None | Some(ImageDetail::Low) => LOW_DETAIL_IMAGE_TOKENS,
        Some(ImageDetail::High | ImageDetail::Auto) => HIGH_DETAIL_IMAGE_TOKENS,
    }
}

/// BPE counts using the OpenAI encodings: `o200k_base` for the gpt-4o and
/// o-series families, `cl100k_base` for everything else.
pub struct TiktokenTokenizer {
    cl100k: CoreBPE,
    o200k: CoreBPE,
}

impl TiktokenTokenizer {
    pub fn new() -> Result<Self, ChatError> {
        let cl100k = cl100k_base()
            .map_err(|err| ChatError::invalid_configuration(format!("load cl100k_base: {err}")))?;
        let o200k = o200k_base()
            .map_err(|err| ChatError::invalid_configuration(format!("load o200k_base: {err}")))?;

        Ok(Self { cl100k, o200k })
    }

    fn encoding_for(&self, model: &str) -> &CoreBPE {
        let model = model.rsplit('/').next().unwrap_or(model);
        let o200k = model.starts_with("gpt-4o")
            || model.starts_with("gpt-4.1")
            || model.starts_with("gpt-5")
            || model.starts_with("o1")
            || model.starts_with("o3")
            || model.starts_with("o4");

        if o200k { &self.o200k } else { &self.cl100k }
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count_text(&self, text: &str, model: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.encoding_for(model).encode_with_special_tokens(text).len()
    }
}

impl std::fmt::Debug for TiktokenTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenTokenizer").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducedContext {
    pub messages: Messages,
    pub input_tokens: usize,
}

pub trait ContextReducer: Send + Sync {
    /// Keeps the most recent turns whose cost fits `budget`.
    ///
    /// Fails with `ContextExceedLimit` when not even the final user turn fits.
    fn reduce(
        &self,
        messages: Messages,
        model: &str,
        budget: usize,
    ) -> Result<ReducedContext, ChatError>;
}

/// Drops oldest turns first and never leaves an assistant turn at the front.
#[derive(Clone)]
pub struct TokenBudgetReducer {
    tokenizer: Arc<dyn Tokenizer>,
}

impl TokenBudgetReducer {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }
}

impl ContextReducer for TokenBudgetReducer {
    fn reduce(
        &self,
        messages: Messages,
        model: &str,
        budget: usize,
    ) -> Result<ReducedContext, ChatError> {
        let costs = messages
            .iter()
            .map(|message| self.tokenizer.count_message(message, model))
            .collect::<Vec<_>>();

        let mut start = 0;
        let mut total = costs.iter().sum::<usize>() + REPLY_PRIMER_TOKENS;
        loop {
            while start < messages.len() && messages[start].role != Role::User {
                total -= costs[start];
                start += 1;
            }
            if start >= messages.len() {
                return Err(ChatError::context_exceed_limit());
            }
            if total <= budget {
                break;
            }
            total -= costs[start];
            start += 1;
        }

        let mut messages = messages.into_inner();
        messages.drain(..start);
        Ok(ReducedContext {
            messages: Messages::from(messages),
            input_tokens: total,
        })
    }
}

impl std::fmt::Debug for TokenBudgetReducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBudgetReducer").finish_non_exhaustive()
    }
}
