//! Fits a conversation into the serving model's context window.

use std::sync::Arc;

use scommon::word_count;
use serde::Deserialize;
use sprovider::{ChatBackend, ChatRequest, ImageDetail, Messages, Role};

use crate::ChatError;
use crate::tokens::{ContextReducer, Tokenizer};

/// Absolute ceilings for the trailing message, checked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MessageLimits {
    pub max_message_tokens: usize,
    pub max_message_words: usize,
}

impl Default for MessageLimits {
    fn default() -> Self {
        Self {
            max_message_tokens: 4000,
            max_message_words: 20000,
        }
    }
}

impl MessageLimits {
    pub fn with_max_message_tokens(mut self, tokens: usize) -> Self {
        self.max_message_tokens = tokens;
        self
    }

    pub fn with_max_message_words(mut self, words: usize) -> Self {
        self.max_message_words = words;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FittedRequest {
    pub request: ChatRequest,
    /// Tokens of the system messages plus the kept conversation.
    pub input_tokens: usize,
}

#[derive(Clone)]
pub struct ContextFitter {
    tokenizer: Arc<dyn Tokenizer>,
    reducer: Arc<dyn ContextReducer>,
    limits: MessageLimits,
}

impl ContextFitter {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, reducer: Arc<dyn ContextReducer>) -> Self {
        Self {
            tokenizer,
            reducer,
            limits: MessageLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: MessageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> MessageLimits {
        self.limits
    }

    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Trims history so the request fits both the caller's `max_token_count`
    /// and the window `backend` reports for the model.
    ///
    /// History is first capped to `max_context_messages` recent turns, then
    /// reduced by token cost. Images without a detail level are set to `low`
    /// before any counting happens.
    pub async fn fit(
        &self,
        request: ChatRequest,
        backend: &dyn ChatBackend,
        max_context_messages: usize,
        max_token_count: usize,
    ) -> Result<FittedRequest, ChatError> {
        let mut request = request;
        let model = request.model.clone();
        let messages = std::mem::take(&mut request.messages).with_default_image_detail(ImageDetail::Low);
        let (system, chat) = messages.split_system();

        // The reducer charges the reply primer, so system turns are counted bare.
        let system_tokens = system
            .iter()
            .map(|message| self.tokenizer.count_message(message, &model))
            .sum::<usize>();
        let window = backend.max_context_length(&model).await;
        let budget = max_token_count.min(window.saturating_sub(system_tokens));

        let capped = cap_recent_turns(chat, max_context_messages);
        let reduced = self.reducer.reduce(capped, &model, budget)?;

        if let Some(last) = reduced.messages.last() {
            let tokens = self.tokenizer.count_text(&last.content, &model);
            if tokens >= self.limits.max_message_tokens
                || word_count(&last.content) >= self.limits.max_message_words
            {
                return Err(ChatError::message_too_large());
            }
        }

        request.messages = system.into_iter().chain(reduced.messages).collect();
        Ok(FittedRequest {
            request,
            input_tokens: system_tokens + reduced.input_tokens,
        })
    }
}

impl std::fmt::Debug for ContextFitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextFitter")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

/// Keeps the `limit` most recent turns (at least one), then drops a leading assistant turn.
fn cap_recent_turns(chat: Messages, limit: usize) -> Messages {
    let mut chat = chat.into_inner();
    let limit = limit.max(1);
    if chat.len() > limit {
        chat.drain(..chat.len() - limit);
        if chat.len() > 1 && chat[0].role == Role::Assistant {
            chat.remove(0);
        }
    }
    Messages::from(chat)
}
